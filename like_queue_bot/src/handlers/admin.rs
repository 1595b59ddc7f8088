//! The admin panel: its menus, what its buttons do, and the answers to the
//! prompts it sends.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, UserId};

use crate::{
    app::App,
    conversation::{PendingInput, UserAction},
    database::{AddPointsOutcome, BotStats},
    settings::{SettingKey, Settings, MAX_INPUT},
    spam_guard::block_duration,
    types::{AdminCallback, CallbackData, Reply},
    Error,
};

use super::commands::Command;

fn button(text: impl Into<String>, callback: AdminCallback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, CallbackData::Admin(callback).to_string())
}

fn back_button() -> InlineKeyboardButton {
    button("⬅️ Back", AdminCallback::Menu)
}

#[must_use]
pub fn main_menu() -> Reply {
    let keyboard = InlineKeyboardMarkup::new([
        vec![
            button("👥 Users", AdminCallback::Users),
            button("📋 Queue", AdminCallback::Queue),
        ],
        vec![
            button("⚙️ Settings", AdminCallback::Settings),
            button("📊 Stats", AdminCallback::Stats),
        ],
        vec![button("📢 Announcement", AdminCallback::Announce)],
    ]);
    Reply::text("🔧 <b>Admin panel</b>\n\nPick what to manage:").with_keyboard(keyboard)
}

fn users_menu() -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = UserAction::ALL
        .iter()
        .map(|action| vec![button(action.button(), AdminCallback::User(*action))])
        .collect();
    rows.push(vec![back_button()]);
    Reply::text("👥 <b>Users</b>\n\nPick what to do with a user:")
        .with_keyboard(InlineKeyboardMarkup::new(rows))
}

fn queue_menu() -> Reply {
    let keyboard = InlineKeyboardMarkup::new([
        vec![button("🗑 Remove a video", AdminCallback::DeleteVideo)],
        vec![button("🧹 Clear the queue", AdminCallback::ClearQueue)],
        vec![back_button()],
    ]);
    Reply::text("📋 <b>Queue</b>").with_keyboard(keyboard)
}

fn confirm_clear() -> Reply {
    let keyboard = InlineKeyboardMarkup::new([vec![
        button("✅ Yes, clear it", AdminCallback::ConfirmClearQueue),
        button("❌ No", AdminCallback::Queue),
    ]]);
    Reply::text("⚠️ This removes every video and every like. Are you sure?")
        .with_keyboard(keyboard)
}

fn settings_menu(settings: &Settings) -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SettingKey::ALL
        .iter()
        .map(|key| {
            let text = format!("{}: {}", key.title(), settings.get(*key));
            vec![button(text, AdminCallback::Setting(*key))]
        })
        .collect();
    rows.push(vec![back_button()]);
    Reply::text("⚙️ <b>Settings</b>\n\nPick a setting to change:")
        .with_keyboard(InlineKeyboardMarkup::new(rows))
}

fn stats(stats: &BotStats) -> Reply {
    let mut text = format!(
        concat!(
            "📊 <b>Stats</b>\n\n",
            "👥 Users: {}\n",
            "🎬 Videos: {}\n",
            "👍 Likes: {}\n",
            "⭐ Points handed out: {}\n\n",
            "📅 Last 24 hours:\n",
            "👥 Active users: {}\n",
            "🎬 New videos: {}\n",
            "👍 New likes: {}\n\n",
            "⚙️ Settings:",
        ),
        stats.users,
        stats.videos,
        stats.likes,
        stats.total_points,
        stats.active_users,
        stats.new_videos,
        stats.new_likes,
    );
    for key in SettingKey::ALL {
        let _ = write!(text, "\n{}: {}", key.title(), stats.settings.get(key));
    }

    Reply::text(text).with_keyboard(InlineKeyboardMarkup::new([vec![back_button()]]))
}

/// What to do after an admin pressed a button.
#[derive(Debug, PartialEq)]
pub enum CallbackResult {
    /// Not an admin.
    Denied,
    /// Replace the panel with `reply`, and show `notice` if there is one.
    Edit {
        reply: Reply,
        notice: Option<String>,
    },
    /// Ask the admin for this.
    Prompt(PendingInput),
}

impl From<Reply> for CallbackResult {
    fn from(reply: Reply) -> Self {
        CallbackResult::Edit {
            reply,
            notice: None,
        }
    }
}

pub async fn callback(
    app: &App,
    admin: UserId,
    callback: AdminCallback,
    now: DateTime<Utc>,
) -> Result<CallbackResult, Error> {
    if !app.is_admin(admin).await? {
        app.conversations.take(admin).await;
        log::warn!("{admin} pressed an admin button without being an admin.");
        return Ok(CallbackResult::Denied);
    }

    let prompt = match callback {
        AdminCallback::Menu => return Ok(main_menu().into()),
        AdminCallback::Users => return Ok(users_menu().into()),
        AdminCallback::Queue => return Ok(queue_menu().into()),
        AdminCallback::Settings => return Ok(settings_menu(&app.db.settings().await?).into()),
        AdminCallback::Stats => return Ok(stats(&app.db.stats(now).await?).into()),
        AdminCallback::ClearQueue => return Ok(confirm_clear().into()),
        AdminCallback::ConfirmClearQueue => {
            let videos = app.db.clear_queue().await?;
            log::info!("{admin} cleared the queue of {videos} videos.");
            return Ok(CallbackResult::Edit {
                reply: main_menu(),
                notice: Some(format!("The queue is cleared, {videos} videos removed.")),
            });
        }
        AdminCallback::DeleteVideo => PendingInput::VideoToDelete,
        AdminCallback::Announce => PendingInput::Announcement,
        AdminCallback::Setting(key) => PendingInput::SettingValue(key),
        AdminCallback::User(action) => PendingInput::TargetUser(action),
    };

    app.conversations.begin(admin, prompt).await;
    Ok(CallbackResult::Prompt(prompt))
}

/// What came out of an admin answering a prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Tell the admin this.
    Reply(String),
    /// Send this announcement to everyone.
    Broadcast(String),
    /// The user is no longer an admin, the answer is ignored.
    Abandoned,
}

fn parse_user_id(text: &str) -> Option<UserId> {
    text.trim().parse().ok().map(UserId)
}

/// Handle `text` sent by `admin` in answer to `pending`, which has been
/// taken out of the conversation state already.
pub async fn advance(
    app: &App,
    admin: UserId,
    pending: PendingInput,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Step, Error> {
    if !app.is_admin(admin).await? {
        return Ok(Step::Abandoned);
    }

    let reply = match pending {
        PendingInput::VideoToDelete => {
            let Ok(video_id) = text.trim().trim_start_matches('#').parse::<i64>() else {
                return Ok(Step::Reply("❌ That's not a video number.".to_string()));
            };
            if app.db.delete_video(video_id).await? {
                log::info!("{admin} removed video #{video_id}.");
                format!("✅ Video #{video_id} is removed from the queue.")
            } else {
                format!("❌ There's no video number {video_id}.")
            }
        }
        PendingInput::Announcement => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Step::Reply("❌ The announcement is empty.".to_string()));
            }
            return Ok(Step::Broadcast(text.to_string()));
        }
        PendingInput::SettingValue(key) => match key.validate(text) {
            Ok(value) => {
                app.db.set_setting(key, value).await?;
                log::info!("{admin} set {key} to {value}.");
                format!("✅ {} is now {value}.", key.title())
            }
            Err(message) => format!("❌ {message}"),
        },
        PendingInput::TargetUser(action) => {
            let Some(user) = parse_user_id(text) else {
                return Ok(Step::Reply("❌ That's not a user ID.".to_string()));
            };
            if app.db.get_user(user).await?.is_none() {
                return Ok(Step::Reply(format!("❌ There's no user with ID {user}.")));
            }
            target_user(app, admin, action, user, now).await?
        }
        PendingInput::PointsFor(user) => {
            let amount = match text.trim().parse::<i64>() {
                Ok(amount) if (-MAX_INPUT..=MAX_INPUT).contains(&amount) => amount,
                _ => {
                    return Ok(Step::Reply(format!(
                        "❌ Please send a whole number between -{MAX_INPUT} and {MAX_INPUT}."
                    )))
                }
            };
            match app.db.add_points(user, amount).await? {
                AddPointsOutcome::Added(award) => {
                    log::info!("{admin} gave {amount} points to {user}.");
                    format!(
                        "✅ User {user} now has {} points and is at level {}.",
                        award.points, award.level
                    )
                }
                AddPointsOutcome::NoSuchUser => format!("❌ There's no user with ID {user}."),
                AddPointsOutcome::OutOfRange => {
                    format!("❌ User {user} can't have that many points.")
                }
            }
        }
        PendingInput::LevelFor(user) => {
            let level = match text.trim().parse::<i64>() {
                Ok(level) if (1..=MAX_INPUT).contains(&level) => level,
                _ => {
                    return Ok(Step::Reply(format!(
                        "❌ The level must be a number from 1 to {MAX_INPUT}."
                    )))
                }
            };
            if app.db.set_level(user, level).await? {
                log::info!("{admin} set the level of {user} to {level}.");
                format!("✅ User {user} is now at level {level}.")
            } else {
                format!("❌ There's no user with ID {user}.")
            }
        }
    };

    Ok(Step::Reply(reply))
}

/// Do `action` to `user`, who is known to exist.
async fn target_user(
    app: &App,
    admin: UserId,
    action: UserAction,
    user: UserId,
    now: DateTime<Utc>,
) -> Result<String, Error> {
    let reply = match action {
        UserAction::MakeAdmin => {
            app.db.set_admin(user, true).await?;
            log::info!("{admin} made {user} an admin.");
            format!("✅ User {user} is now an admin.")
        }
        UserAction::ResetLikes => {
            app.db.reset_likes(user).await?;
            log::info!("{admin} reset likes of {user}.");
            format!("✅ Likes of user {user} are reset.")
        }
        UserAction::AddPoints | UserAction::SetLevel => {
            let next = if action == UserAction::AddPoints {
                PendingInput::PointsFor(user)
            } else {
                PendingInput::LevelFor(user)
            };
            app.conversations.begin(admin, next).await;
            next.prompt()
        }
        UserAction::Block => {
            let commands: Vec<&str> = Command::blockable().collect();
            app.db.block_user(user, &commands, now + block_duration()).await?;
            log::info!("{admin} blocked {user}.");
            format!("✅ User {user} is blocked.")
        }
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{database::Profile, spam_guard};

    fn time(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    const ADMIN: UserId = UserId(1);

    async fn app_with_user() -> App {
        let app = App::for_tests().await;
        let user = Profile {
            id: UserId(2),
            username: Some("alice"),
            first_name: "Alice",
            last_name: None,
        };
        app.db.register_user(&user, time(0)).await.unwrap();
        app
    }

    /// Press the button, answer the prompt it gives.
    async fn answer(app: &App, button: AdminCallback, text: &str) -> Step {
        let CallbackResult::Prompt(pending) = callback(app, ADMIN, button, time(0)).await.unwrap()
        else {
            panic!("{button:?} didn't prompt");
        };
        let taken = app.conversations.take(ADMIN).await.unwrap();
        assert_eq!(taken, pending);
        advance(app, ADMIN, taken, text, time(0)).await.unwrap()
    }

    fn reply_text(step: Step) -> String {
        match step {
            Step::Reply(text) => text,
            other => panic!("{other:?}"),
        }
    }

    #[tokio::test]
    async fn non_admins_are_turned_away() {
        let app = app_with_user().await;
        let user = UserId(2);
        app.conversations
            .begin(user, PendingInput::Announcement)
            .await;

        assert_eq!(
            callback(&app, user, AdminCallback::Stats, time(0)).await.unwrap(),
            CallbackResult::Denied
        );
        assert_eq!(app.conversations.take(user).await, None);

        assert_eq!(
            advance(&app, user, PendingInput::Announcement, "hi", time(0))
                .await
                .unwrap(),
            Step::Abandoned
        );

        // Admins from the database get in too.
        app.db.set_admin(user, true).await.unwrap();
        assert!(matches!(
            callback(&app, user, AdminCallback::Stats, time(0)).await.unwrap(),
            CallbackResult::Edit { .. }
        ));
    }

    #[tokio::test]
    async fn menus() {
        let app = app_with_user().await;
        app.db.set_setting(SettingKey::SpamTimeout, 9).await.unwrap();

        let CallbackResult::Edit { reply, .. } =
            callback(&app, ADMIN, AdminCallback::Settings, time(0)).await.unwrap()
        else {
            panic!("no settings menu");
        };
        let keyboard = reply.keyboard.unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), SettingKey::ALL.len() + 1);
        assert_eq!(keyboard.inline_keyboard[4][0].text, "Spam timeout (seconds): 9");

        let CallbackResult::Edit { reply, .. } =
            callback(&app, ADMIN, AdminCallback::Stats, time(0)).await.unwrap()
        else {
            panic!("no stats");
        };
        assert!(reply.text.contains("👥 Users: 1\n"), "{}", reply.text);
        assert!(reply.text.contains("Spam timeout (seconds): 9"), "{}", reply.text);
    }

    #[tokio::test]
    async fn clearing_the_queue() {
        let app = app_with_user().await;
        app.db.set_setting(SettingKey::LikesRequired, 0).await.unwrap();
        app.db
            .record_submission(UserId(2), "https://vm.tiktok.com/t/abc", time(0))
            .await
            .unwrap();

        // Asking doesn't remove anything yet.
        callback(&app, ADMIN, AdminCallback::ClearQueue, time(0))
            .await
            .unwrap();
        assert_eq!(app.db.count_videos().await.unwrap(), 1);

        let result = callback(&app, ADMIN, AdminCallback::ConfirmClearQueue, time(0))
            .await
            .unwrap();
        assert_eq!(
            result,
            CallbackResult::Edit {
                reply: main_menu(),
                notice: Some("The queue is cleared, 1 videos removed.".to_string()),
            }
        );
        assert_eq!(app.db.count_videos().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_videos() {
        let app = app_with_user().await;
        app.db.set_setting(SettingKey::LikesRequired, 0).await.unwrap();
        app.db
            .record_submission(UserId(2), "https://vm.tiktok.com/t/abc", time(0))
            .await
            .unwrap();

        let text = reply_text(answer(&app, AdminCallback::DeleteVideo, "#5").await);
        assert_eq!(text, "❌ There's no video number 5.");
        let text = reply_text(answer(&app, AdminCallback::DeleteVideo, "five").await);
        assert!(text.contains("not a video number"));
        let text = reply_text(answer(&app, AdminCallback::DeleteVideo, "1").await);
        assert_eq!(text, "✅ Video #1 is removed from the queue.");
        assert_eq!(app.db.count_videos().await.unwrap(), 0);

        // Every answer ends the prompt, whether it worked or not.
        assert_eq!(app.conversations.take(ADMIN).await, None);
    }

    #[tokio::test]
    async fn changing_settings() {
        let app = app_with_user().await;
        let threshold = AdminCallback::Setting(SettingKey::LevelThreshold);

        let text = reply_text(answer(&app, threshold, "0").await);
        assert_eq!(text, "❌ Points per level can't be less than 1.");
        let text = reply_text(answer(&app, threshold, "lots").await);
        assert_eq!(text, "❌ Please send a whole number.");
        assert_eq!(app.db.settings().await.unwrap().level_threshold, 50);

        let text = reply_text(answer(&app, threshold, " 100 ").await);
        assert_eq!(text, "✅ Points per level is now 100.");
        assert_eq!(app.db.settings().await.unwrap().level_threshold, 100);
    }

    #[tokio::test]
    async fn user_actions() {
        let app = app_with_user().await;
        let alice = UserId(2);

        let text = reply_text(answer(&app, AdminCallback::User(UserAction::MakeAdmin), "3").await);
        assert_eq!(text, "❌ There's no user with ID 3.");
        let text = reply_text(answer(&app, AdminCallback::User(UserAction::MakeAdmin), "x").await);
        assert_eq!(text, "❌ That's not a user ID.");

        reply_text(answer(&app, AdminCallback::User(UserAction::MakeAdmin), "2").await);
        assert!(app.db.is_admin(alice).await.unwrap());

        // Adding points takes two answers.
        let text = reply_text(answer(&app, AdminCallback::User(UserAction::AddPoints), "2").await);
        assert_eq!(text, PendingInput::PointsFor(alice).prompt());
        let pending = app.conversations.take(ADMIN).await.unwrap();
        assert_eq!(pending, PendingInput::PointsFor(alice));
        let text = reply_text(advance(&app, ADMIN, pending, "120", time(0)).await.unwrap());
        assert_eq!(text, "✅ User 2 now has 120 points and is at level 3.");

        let text = reply_text(answer(&app, AdminCallback::User(UserAction::SetLevel), "2").await);
        assert_eq!(text, PendingInput::LevelFor(alice).prompt());
        let pending = app.conversations.take(ADMIN).await.unwrap();
        let text = reply_text(advance(&app, ADMIN, pending, "0", time(0)).await.unwrap());
        assert_eq!(text, "❌ The level must be a number from 1 to 2147483647.");
        assert_eq!(app.conversations.take(ADMIN).await, None);
        let text = reply_text(
            advance(&app, ADMIN, PendingInput::LevelFor(alice), "1", time(0))
                .await
                .unwrap(),
        );
        assert_eq!(text, "✅ User 2 is now at level 1.");
        assert_eq!(app.db.get_user(alice).await.unwrap().unwrap().level, 1);
    }

    #[tokio::test]
    async fn huge_numbers_are_refused() {
        let app = app_with_user().await;
        let alice = UserId(2);

        let text = reply_text(
            advance(&app, ADMIN, PendingInput::PointsFor(alice), "3000000000", time(0))
                .await
                .unwrap(),
        );
        assert_eq!(
            text,
            "❌ Please send a whole number between -2147483647 and 2147483647."
        );
        let text = reply_text(
            advance(&app, ADMIN, PendingInput::LevelFor(alice), "3000000000", time(0))
                .await
                .unwrap(),
        );
        assert_eq!(text, "❌ The level must be a number from 1 to 2147483647.");
        let alice_now = app.db.get_user(alice).await.unwrap().unwrap();
        assert_eq!((alice_now.points, alice_now.level), (0, 1));

        app.db.add_points(alice, i64::MAX).await.unwrap();
        let text = reply_text(
            advance(&app, ADMIN, PendingInput::PointsFor(alice), "1", time(0))
                .await
                .unwrap(),
        );
        assert_eq!(text, "❌ User 2 can't have that many points.");
        assert_eq!(app.db.get_user(alice).await.unwrap().unwrap().points, i64::MAX);

        let text = reply_text(
            answer(&app, AdminCallback::Setting(SettingKey::PointsPerLike), "3000000000").await,
        );
        assert_eq!(text, "❌ Points per like can't be more than 2147483647.");
        assert_eq!(app.db.settings().await.unwrap().points_per_like, 5);
    }

    #[tokio::test]
    async fn blocking_and_resetting() {
        let app = app_with_user().await;
        let alice = UserId(2);
        app.db.set_setting(SettingKey::LikesRequired, 1).await.unwrap();

        reply_text(answer(&app, AdminCallback::User(UserAction::Block), "2").await);
        for command in ["submit", "like", "queue", "help"] {
            assert!(!spam_guard::admit(&app, alice, command, time(86400)).await.unwrap());
        }

        app.db.set_setting(SettingKey::LikesRequired, 0).await.unwrap();
        app.db
            .record_submission(alice, "https://vm.tiktok.com/t/abc", time(0))
            .await
            .unwrap();
        app.db.set_setting(SettingKey::LikesRequired, 1).await.unwrap();
        let bob = Profile {
            id: UserId(3),
            username: None,
            first_name: "Bob",
            last_name: None,
        };
        app.db.register_user(&bob, time(0)).await.unwrap();
        app.db.record_like(bob.id, 1, time(0)).await.unwrap();
        assert_eq!(app.db.submission_shortfall(bob.id).await.unwrap(), None);

        reply_text(answer(&app, AdminCallback::User(UserAction::ResetLikes), "3").await);
        assert_eq!(app.db.submission_shortfall(bob.id).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn announcements() {
        let app = app_with_user().await;
        assert_eq!(
            answer(&app, AdminCallback::Announce, "  New <rules>  ").await,
            Step::Broadcast("New <rules>".to_string())
        );
        assert_eq!(
            answer(&app, AdminCallback::Announce, "   ").await,
            Step::Reply("❌ The announcement is empty.".to_string())
        );
    }
}
