use chrono::{DateTime, TimeDelta, Utc};
use teloxide::types::UserId;

use crate::{app::App, Error};

/// How long a blocked user stays blocked.
#[must_use]
pub fn block_duration() -> TimeDelta {
    TimeDelta::days(365 * 100)
}

/// Whether a command last used at `last` may be used again at `now`.
///
/// A `last` that's in the future is a block, and always forbids.
#[must_use]
pub fn window_allows(last: Option<DateTime<Utc>>, now: DateTime<Utc>, timeout_secs: i64) -> bool {
    let Some(last) = last else {
        return true;
    };
    if last > now {
        return false;
    }
    (now - last).num_seconds() >= timeout_secs
}

/// Check if `user` may run `command` now, and if so, remember that they did.
///
/// Admins may always run everything, and aren't remembered.
pub async fn admit(
    app: &App,
    user: UserId,
    command: &str,
    now: DateTime<Utc>,
) -> Result<bool, Error> {
    if app.is_admin(user).await? {
        return Ok(true);
    }

    if !app.db.admit_command(user, command, now).await? {
        log::debug!("Rejecting /{command} from {user}, too soon.");
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{database::Profile, settings::SettingKey};

    fn time(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    #[test]
    fn windows() {
        assert!(window_allows(None, time(0), 5));
        assert!(!window_allows(Some(time(0)), time(4), 5));
        assert!(window_allows(Some(time(0)), time(5), 5));
        assert!(window_allows(Some(time(0)), time(0), 0));
        assert!(!window_allows(Some(time(100)), time(0), 0));
        assert!(!window_allows(Some(time(0) + block_duration()), time(0), 5));
    }

    #[tokio::test]
    async fn repeated_commands() {
        let app = App::for_tests().await;
        let user = Profile {
            id: UserId(2),
            username: Some("bob"),
            first_name: "Bob",
            last_name: None,
        };
        app.db.register_user(&user, time(0)).await.unwrap();

        assert!(admit(&app, user.id, "queue", time(0)).await.unwrap());
        assert!(!admit(&app, user.id, "queue", time(3)).await.unwrap());
        // Other commands have their own window.
        assert!(admit(&app, user.id, "status", time(3)).await.unwrap());
        // The rejected attempt didn't restart the window.
        assert!(admit(&app, user.id, "queue", time(5)).await.unwrap());
        assert!(!admit(&app, user.id, "queue", time(9)).await.unwrap());

        app.db.set_setting(SettingKey::SpamTimeout, 0).await.unwrap();
        assert!(admit(&app, user.id, "queue", time(9)).await.unwrap());
    }

    #[tokio::test]
    async fn simultaneous_commands_count_once() {
        let app = App::for_tests().await;
        let user = UserId(2);

        let (first, second) = tokio::join!(
            admit(&app, user, "like", time(0)),
            admit(&app, user, "like", time(0)),
        );
        assert!(first.unwrap() ^ second.unwrap());
        assert_eq!(
            app.db.last_command_time(user, "like").await.unwrap(),
            Some(time(0))
        );
    }

    #[tokio::test]
    async fn admins_are_not_limited() {
        let app = App::for_tests().await;
        // User 1 is an admin in the configuration, user 3 in the database.
        for id in [1, 3] {
            let user = Profile {
                id: UserId(id),
                username: None,
                first_name: "Admin",
                last_name: None,
            };
            app.db.register_user(&user, time(0)).await.unwrap();
        }
        app.db.set_admin(UserId(3), true).await.unwrap();

        for admin in [UserId(1), UserId(3)] {
            for _ in 0..3 {
                assert!(admit(&app, admin, "like", time(0)).await.unwrap());
            }
            assert_eq!(app.db.last_command_time(admin, "like").await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn blocked_users_stay_blocked() {
        let app = App::for_tests().await;
        let user = UserId(2);
        app.db
            .block_user(user, &["like"], time(0) + block_duration())
            .await
            .unwrap();

        assert!(!admit(&app, user, "like", time(0)).await.unwrap());
        assert!(!admit(&app, user, "like", time(86400 * 365)).await.unwrap());
        assert!(admit(&app, user, "queue", time(0)).await.unwrap());
    }
}
