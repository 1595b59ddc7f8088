pub mod admin;
pub mod commands;

use std::sync::Arc;

use bot_commons::commands::MessageStuff;
use chrono::{DateTime, Utc};
use teloxide::{
    payloads::{AnswerCallbackQuerySetters, EditMessageTextSetters, SendMessageSetters},
    requests::Requester,
    sugar::request::RequestReplyExt,
    types::{CallbackQuery, Me, Message, ParseMode, User},
    ApiError, Bot, RequestError,
};

use crate::{
    actions::broadcast_announcement,
    app::App,
    database::Profile,
    types::{CallbackData, Reply},
    Error,
};

use admin::{CallbackResult, Step};
use commands::Command;

const FAILURE_REPLY: &str = "Something went wrong, please try again later.";

async fn send_reply(bot: &Bot, message: &Message, reply: Reply) -> Result<(), RequestError> {
    let mut request = bot
        .send_message(message.chat.id, reply.text)
        .reply_to(message.id)
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}

/// Replace the text and buttons of a message the bot sent earlier.
async fn edit_reply(bot: &Bot, message: &Message, reply: Reply) -> Result<(), RequestError> {
    let mut request = bot
        .edit_message_text(message.chat.id, message.id, reply.text)
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }

    match request.await {
        // Pressing the button of the page that's already shown.
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

pub async fn handle_message(
    bot: Bot,
    me: Me,
    message: Message,
    app: Arc<App>,
) -> Result<(), RequestError> {
    let Some(user) = &message.from else {
        return Ok(());
    };
    // Bots don't get to play.
    if user.is_bot {
        return Ok(());
    }

    match respond_to_message(&bot, &me, &message, user, &app, Utc::now()).await {
        Ok(Some(reply)) => send_reply(&bot, &message, reply).await,
        Ok(None) => Ok(()),
        Err(e) => {
            log::error!("Failed to handle a message from {}: {e}", user.id);
            send_reply(&bot, &message, Reply::text(FAILURE_REPLY)).await
        }
    }
}

async fn respond_to_message(
    bot: &Bot,
    me: &Me,
    message: &Message,
    user: &User,
    app: &App,
    now: DateTime<Utc>,
) -> Result<Option<Reply>, Error> {
    let Some(text) = message.text_full() else {
        return Ok(None);
    };

    if let Some(command) = message.command(me.username()) {
        let Some(command_info) = Command::find(command.name) else {
            app.conversations.take(user.id).await;
            return Ok(None);
        };
        return commands::run(app, &Profile::from(user), command_info, command.params, now).await;
    }

    if text.starts_with('/') {
        // Commands for other bots still cancel prompts.
        app.conversations.take(user.id).await;
        return Ok(None);
    }

    let Some(pending) = app.conversations.take(user.id).await else {
        return Ok(None);
    };

    let reply = match admin::advance(app, user.id, pending, text, now).await? {
        Step::Reply(text) => text,
        Step::Broadcast(announcement) => {
            let sent = broadcast_announcement(bot, &app.db, &announcement).await?;
            format!("✅ Announcement sent to {sent} users.")
        }
        Step::Abandoned => return Ok(None),
    };

    Ok(Some(Reply::text(reply)))
}

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    app: Arc<App>,
) -> Result<(), RequestError> {
    macro_rules! goodbye {
        ($text:expr) => {
            bot.answer_callback_query(query.id.clone()).text($text).await?;
            return Ok(());
        };
        () => {
            bot.answer_callback_query(query.id.clone()).await?;
            return Ok(());
        };
    }

    let Some(data) = query.data.as_deref() else {
        goodbye!("No query data.");
    };

    let data = match data.parse::<CallbackData>() {
        Ok(data) => data,
        Err(e) => {
            log::debug!("Got bad callback data {data:?}: {e}");
            goodbye!("This button doesn't work anymore.");
        }
    };

    let Some(message) = query.regular_message() else {
        // May happen if the message is too old.
        goodbye!("This message is too old, please send the command again.");
    };

    match press_button(&bot, &query.from, message, data, &app, Utc::now()).await {
        Ok(Some(notice)) => {
            goodbye!(notice);
        }
        Ok(None) => {
            goodbye!();
        }
        Err(e) => {
            log::error!("Failed to handle a button press from {}: {e}", query.from.id);
            goodbye!(FAILURE_REPLY);
        }
    }
}

/// Returns the notice to show to the user, if any.
async fn press_button(
    bot: &Bot,
    user: &User,
    message: &Message,
    data: CallbackData,
    app: &App,
    now: DateTime<Utc>,
) -> Result<Option<String>, Error> {
    app.db.register_user(&Profile::from(user), now).await?;

    let callback = match data {
        CallbackData::QueuePage { offset } => {
            let reply = commands::queue_page(app, user.id, offset).await?;
            edit_reply(bot, message, reply).await?;
            return Ok(None);
        }
        CallbackData::Admin(callback) => callback,
    };

    match admin::callback(app, user.id, callback, now).await? {
        CallbackResult::Denied => Ok(Some("You're not an admin.".to_string())),
        CallbackResult::Edit { reply, notice } => {
            edit_reply(bot, message, reply).await?;
            Ok(notice)
        }
        CallbackResult::Prompt(input) => {
            bot.send_message(user.id, input.prompt()).await?;
            Ok(None)
        }
    }
}
