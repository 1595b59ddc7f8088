use std::fmt::Write;

use chrono::{DateTime, Utc};
use html_escape::encode_text;
use teloxide::types::{BotCommand, InlineKeyboardButton, InlineKeyboardMarkup, UserId};

use crate::{
    app::App,
    database::{display_name, LikeOutcome, Profile, SubmitOutcome},
    links::parse_tiktok_url,
    scoring::Award,
    spam_guard,
    types::{CallbackData, Reply},
    Error, LEADERBOARD_SIZE, QUEUE_PAGE_SIZE,
};

use super::admin;

pub const COMMANDS: &[Command] = &[
    START,
    HELP,
    SUBMIT,
    LIKE,
    QUEUE,
    STATUS,
    LEADERBOARD,
    ADMIN,
];

const SPAM_REPLY: &str = "Please don't send commands so often.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Start,
    Help,
    Submit,
    Like,
    Queue,
    Status,
    Leaderboard,
    Admin,
}

pub struct Command {
    /// Name without the `/`.
    pub callname: &'static str,
    /// How the parameters look, for the help text. HTML.
    pub params: &'static str,
    pub description: &'static str,
    pub kind: CommandKind,
    /// Not listed in the help or in the bot's command list.
    hidden: bool,
    /// Goes through the [spam guard](crate::spam_guard).
    pub spam_guarded: bool,
}

impl Command {
    #[must_use]
    pub fn find(callname: &str) -> Option<&'static Command> {
        COMMANDS
            .iter()
            .find(|command| command.callname.eq_ignore_ascii_case(callname))
    }

    /// Names of all commands that users can be blocked from.
    pub fn blockable() -> impl Iterator<Item = &'static str> {
        COMMANDS
            .iter()
            .filter(|command| command.spam_guarded)
            .map(|command| command.callname)
    }

    #[must_use]
    pub fn generate_help() -> String {
        let mut response = String::from("Here's what I can do:\n\n");
        for command in COMMANDS {
            if command.hidden {
                continue;
            }
            let _ = write!(response, "/{}", command.callname);
            if !command.params.is_empty() {
                let _ = write!(response, " {}", command.params);
            }
            let _ = writeln!(response, " - {}", command.description);
        }
        response.pop();
        response
    }

    #[must_use]
    pub fn generate_bot_commands() -> Vec<BotCommand> {
        COMMANDS
            .iter()
            .filter(|command| !command.hidden)
            .map(|command| BotCommand::new(command.callname, command.description))
            .collect()
    }
}

///////////////////////////////////////
/////////////////COMMAND DEFINITIONS
///////////////////////////////////////

const START: Command = Command {
    callname: "start",
    params: "",
    description: "Start using the bot",
    kind: CommandKind::Start,
    hidden: true,
    spam_guarded: true,
};

const HELP: Command = Command {
    callname: "help",
    params: "",
    description: "Show what the bot can do",
    kind: CommandKind::Help,
    hidden: false,
    spam_guarded: true,
};

const SUBMIT: Command = Command {
    callname: "submit",
    params: "&lt;link&gt;",
    description: "Add your TikTok video to the queue",
    kind: CommandKind::Submit,
    hidden: false,
    spam_guarded: true,
};

const LIKE: Command = Command {
    callname: "like",
    params: "&lt;number&gt;",
    description: "Confirm that you liked a video from the queue",
    kind: CommandKind::Like,
    hidden: false,
    spam_guarded: true,
};

const QUEUE: Command = Command {
    callname: "queue",
    params: "",
    description: "Show the videos in the queue",
    kind: CommandKind::Queue,
    hidden: false,
    spam_guarded: true,
};

const STATUS: Command = Command {
    callname: "status",
    params: "",
    description: "Show your points, level and achievements",
    kind: CommandKind::Status,
    hidden: false,
    spam_guarded: true,
};

const LEADERBOARD: Command = Command {
    callname: "leaderboard",
    params: "",
    description: "Show the users with the most points",
    kind: CommandKind::Leaderboard,
    hidden: false,
    spam_guarded: true,
};

const ADMIN: Command = Command {
    callname: "admin",
    params: "",
    description: "Admin panel",
    kind: CommandKind::Admin,
    hidden: true,
    spam_guarded: false,
};

/// Handle a command from a user.
///
/// Returns [`None`] if the bot should stay silent.
pub async fn run(
    app: &App,
    profile: &Profile<'_>,
    command: &Command,
    params: &str,
    now: DateTime<Utc>,
) -> Result<Option<Reply>, Error> {
    let user = profile.id;
    app.db.register_user(profile, now).await?;

    if app.conversations.take(user).await.is_some() {
        log::debug!("{user} sent /{} instead of answering a prompt.", command.callname);
    }

    if command.spam_guarded && !spam_guard::admit(app, user, command.callname, now).await? {
        return Ok(Some(Reply::text(SPAM_REPLY)));
    }

    let reply = match command.kind {
        CommandKind::Start => start(app, profile).await?,
        CommandKind::Help => Reply::text(Command::generate_help()),
        CommandKind::Submit => submit(app, user, params, now).await?,
        CommandKind::Like => like(app, user, params, now).await?,
        CommandKind::Queue => queue_page(app, user, 0).await?,
        CommandKind::Status => status(app, user, now).await?,
        CommandKind::Leaderboard => leaderboard(app).await?,
        CommandKind::Admin => {
            if !app.is_admin(user).await? {
                return Ok(None);
            }
            admin::main_menu()
        }
    };

    Ok(Some(reply))
}

/// Lines about a level-up, if there was one.
fn describe_level_up(award: &Award, text: &mut String) {
    if award.level_up {
        let _ = write!(text, "\n🎉 Congratulations! You reached level {}!", award.level);
    }
    if award.level_bonus > 0 {
        let _ = write!(text, "\n💰 Level-up bonus: +{} points!", award.level_bonus);
    }
}

fn shortfall_text(shortfall: i64) -> String {
    format!(
        concat!(
            "You can't add a video until you like {} more from the queue.\n",
            "Use /queue to see the queue and /like &lt;number&gt; to confirm a like."
        ),
        shortfall
    )
}

async fn start(app: &App, profile: &Profile<'_>) -> Result<Reply, Error> {
    if app.config.is_static_admin(profile.id) && !app.db.is_admin(profile.id).await? {
        app.db.set_admin(profile.id, true).await?;
        log::info!("Gave the admin flag to {}.", profile.id);
    }

    let name = display_name(profile.username, profile.first_name, profile.last_name);
    let likes_required = app.db.settings().await?.likes_required;

    Ok(Reply::text(format!(
        concat!(
            "👋 Hi, {}!\n\n",
            "I keep a queue of TikTok videos. {}\n\n",
            "To add a video of your own, first like {} videos from the queue."
        ),
        encode_text(&name),
        Command::generate_help(),
        likes_required
    )))
}

async fn submit(app: &App, user: UserId, params: &str, now: DateTime<Utc>) -> Result<Reply, Error> {
    if let Some(shortfall) = app.db.submission_shortfall(user).await? {
        return Ok(Reply::text(shortfall_text(shortfall)));
    }

    let Some(link) = params.split_whitespace().next() else {
        return Ok(Reply::text(concat!(
            "Please put a link to a TikTok video after the command.\n",
            "Example: <code>/submit https://www.tiktok.com/@username/video/1234567890</code>"
        )));
    };

    let Some(url) = parse_tiktok_url(link) else {
        return Ok(Reply::text(concat!(
            "❌ That's not a TikTok video link. ",
            "Please make sure you're sending a proper link to a video."
        )));
    };

    match app.db.record_submission(user, url.as_str(), now).await? {
        SubmitOutcome::Submitted { video_id, award } => {
            log::info!("{user} submitted video #{video_id}: {url}");
            let mut text = format!(
                "✅ Your video is in the queue as number {video_id}!\nUse /queue to see the queue."
            );
            describe_level_up(&award, &mut text);
            Ok(Reply::text(text))
        }
        SubmitOutcome::NotEnoughLikes { shortfall } => Ok(Reply::text(shortfall_text(shortfall))),
    }
}

async fn like(app: &App, user: UserId, params: &str, now: DateTime<Utc>) -> Result<Reply, Error> {
    let Some(number) = params.split_whitespace().next() else {
        return Ok(Reply::text(concat!(
            "Please put the number of a video after the command.\n",
            "Example: <code>/like 42</code>\n\n",
            "Use /queue to see the videos."
        )));
    };

    let Ok(video_id) = number.trim_start_matches('#').parse::<i64>() else {
        return Ok(Reply::text(concat!(
            "❌ Please send a proper video number.\n",
            "Example: <code>/like 42</code>"
        )));
    };

    let text = match app.db.record_like(user, video_id, now).await? {
        LikeOutcome::Liked(report) => {
            log::debug!("{user} liked video #{}.", report.video_id);
            let mut text = format!(
                "✅ Thanks! You confirmed a like for video #{}.",
                report.video_id
            );
            describe_level_up(&report.award, &mut text);
            if report.streak_bonus > 0 {
                let _ = write!(text, "\n🔥 Like streak bonus: +{} points!", report.streak_bonus);
            }
            text
        }
        LikeOutcome::VideoNotFound => format!("❌ There's no video number {video_id} in the queue."),
        LikeOutcome::OwnVideo => "❌ You can't like your own videos.".to_string(),
        LikeOutcome::AlreadyLiked => format!("❌ You already liked video #{video_id}."),
    };

    Ok(Reply::text(text))
}

/// The queue as `viewer` sees it, starting at `offset`, with buttons to
/// flip through it.
pub async fn queue_page(app: &App, viewer: UserId, offset: i64) -> Result<Reply, Error> {
    let offset = offset.max(0);
    let entries = app.db.get_queue(viewer, QUEUE_PAGE_SIZE, offset).await?;

    if entries.is_empty() {
        return Ok(Reply::text(if offset == 0 {
            "📋 The queue is empty. Be the first to add a video!"
        } else {
            "📋 There are no more videos in the queue."
        }));
    }

    let total = app.db.count_videos().await?;
    let likes_required = app.db.settings().await?.likes_required;

    let mut text = if offset == 0 {
        String::from("📋 Videos in the queue:\n\n")
    } else {
        format!("📋 Videos in the queue (from {}):\n\n", offset + 1)
    };

    for (position, entry) in (offset + 1..).zip(&entries) {
        let _ = write!(
            text,
            "{position}. #{} by {}: {} [{} {}]\n\n",
            entry.video.id,
            encode_text(&entry.submitter),
            encode_text(&entry.video.url),
            if entry.liked { "✅" } else { "👍" },
            entry.video.likes_count,
        );
    }

    let _ = write!(
        text,
        concat!(
            "Use /like &lt;number&gt; to confirm a like.\n",
            "You need to like {} videos to add your own."
        ),
        likes_required
    );

    let mut buttons = vec![];
    if offset > 0 {
        let previous = CallbackData::QueuePage {
            offset: (offset - QUEUE_PAGE_SIZE).max(0),
        };
        buttons.push(InlineKeyboardButton::callback("⬅️ Previous", previous.to_string()));
    }
    if offset + QUEUE_PAGE_SIZE < total {
        let next = CallbackData::QueuePage {
            offset: offset + QUEUE_PAGE_SIZE,
        };
        buttons.push(InlineKeyboardButton::callback("Next ➡️", next.to_string()));
    }

    let reply = Reply::text(text);
    if buttons.is_empty() {
        Ok(reply)
    } else {
        Ok(reply.with_keyboard(InlineKeyboardMarkup::new(vec![buttons])))
    }
}

async fn status(app: &App, user: UserId, now: DateTime<Utc>) -> Result<Reply, Error> {
    let Some(status) = app.db.status(user, now).await? else {
        return Ok(Reply::text(
            "❌ Couldn't find your data. Please try /start.",
        ));
    };

    let mut text = format!(
        concat!(
            "📊 Stats of {}:\n\n",
            "👍 Likes given: {}\n",
            "🎬 Videos added: {}\n",
            "⭐ Points: {}\n",
            "🏆 Level: {}\n",
            "📈 Until the next level: {} points\n",
            "🥇 Your rank: {} of {}\n\n",
            "📅 Last 24 hours:\n",
            "👍 Likes: {}\n",
            "🎬 Videos: {}\n",
            "🔋 Activity: {}%\n\n",
        ),
        encode_text(&status.user.display_name()),
        status.user.likes_given,
        status.user.videos_submitted,
        status.user.points,
        status.user.level,
        status.points_to_next_level(),
        status.rank,
        status.total_users,
        status.likes_today,
        status.videos_today,
        status.activity_score(),
    );

    match status.submission_shortfall() {
        None => text.push_str("✅ You can add your video to the queue!"),
        Some(shortfall) => {
            let _ = write!(
                text,
                "❗ You need to like {shortfall} more videos to add your own."
            );
        }
    }

    let achievements = status.achievements();
    if !achievements.is_empty() {
        text.push_str("\n\n🏅 Achievements:");
        for achievement in achievements {
            let _ = write!(text, "\n{achievement}");
        }
    }

    Ok(Reply::text(text))
}

async fn leaderboard(app: &App) -> Result<Reply, Error> {
    let top = app.db.leaderboard(LEADERBOARD_SIZE).await?;
    if top.is_empty() {
        return Ok(Reply::text("📊 The leaderboard is empty."));
    }

    let mut text = String::from("🏆 Leaderboard:\n\n");
    for (place, user) in (1..).zip(&top) {
        let medal = match place {
            1 => "🥇".to_string(),
            2 => "🥈".to_string(),
            3 => "🥉".to_string(),
            _ => format!("{place}."),
        };
        let _ = write!(
            text,
            "{medal} {}: {} points (level {})\n   👍 {} likes | 🎬 {} videos\n\n",
            encode_text(&user.display_name()),
            user.points,
            user.level,
            user.likes_given,
            user.videos_submitted,
        );
    }
    text.truncate(text.trim_end().len());

    Ok(Reply::text(text))
}
