use std::{fmt::Display, str::FromStr};

use teloxide::types::InlineKeyboardMarkup;

use crate::{conversation::UserAction, settings::SettingKey};

/// What the bot answers with. Text is HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Reply {
        Reply {
            text: text.into(),
            keyboard: None,
        }
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Reply {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Buttons of the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCallback {
    /// The main panel.
    Menu,
    Users,
    Queue,
    Settings,
    Stats,
    /// Asks if the admin is sure.
    ClearQueue,
    /// Actually clears the queue.
    ConfirmClearQueue,
    DeleteVideo,
    Announce,
    Setting(SettingKey),
    User(UserAction),
}

/// Data carried by inline keyboard buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    /// Show the queue starting at this offset.
    QueuePage { offset: i64 },
    Admin(AdminCallback),
}

impl Display for CallbackData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackData::QueuePage { offset } => write!(f, "queue {offset}"),
            CallbackData::Admin(admin) => {
                f.write_str("admin ")?;
                match admin {
                    AdminCallback::Menu => f.write_str("menu"),
                    AdminCallback::Users => f.write_str("users"),
                    AdminCallback::Queue => f.write_str("queue"),
                    AdminCallback::Settings => f.write_str("settings"),
                    AdminCallback::Stats => f.write_str("stats"),
                    AdminCallback::ClearQueue => f.write_str("clear"),
                    AdminCallback::ConfirmClearQueue => f.write_str("clear_confirm"),
                    AdminCallback::DeleteVideo => f.write_str("delete_video"),
                    AdminCallback::Announce => f.write_str("announce"),
                    AdminCallback::Setting(key) => write!(f, "set {key}"),
                    AdminCallback::User(action) => write!(f, "user {action}"),
                }
            }
        }
    }
}

impl FromStr for CallbackData {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut iter = s.split_ascii_whitespace();
        let kind = iter.next().ok_or("Empty callback data")?;

        let data = match kind {
            "queue" => {
                let offset: i64 = iter
                    .next()
                    .ok_or("No offset")?
                    .parse()
                    .map_err(|_| "Failed to parse offset")?;
                if offset < 0 {
                    return Err("Negative offset");
                }
                CallbackData::QueuePage { offset }
            }
            "admin" => {
                let admin = match iter.next().ok_or("No admin action")? {
                    "menu" => AdminCallback::Menu,
                    "users" => AdminCallback::Users,
                    "queue" => AdminCallback::Queue,
                    "settings" => AdminCallback::Settings,
                    "stats" => AdminCallback::Stats,
                    "clear" => AdminCallback::ClearQueue,
                    "clear_confirm" => AdminCallback::ConfirmClearQueue,
                    "delete_video" => AdminCallback::DeleteVideo,
                    "announce" => AdminCallback::Announce,
                    "set" => AdminCallback::Setting(
                        iter.next()
                            .ok_or("No setting")?
                            .parse()
                            .map_err(|()| "Unknown setting")?,
                    ),
                    "user" => AdminCallback::User(
                        iter.next()
                            .ok_or("No user action")?
                            .parse()
                            .map_err(|()| "Unknown user action")?,
                    ),
                    _ => return Err("Unknown admin action"),
                };
                CallbackData::Admin(admin)
            }
            _ => return Err("Unknown callback kind"),
        };

        if iter.next().is_some() {
            return Err("Extraneous data in callback");
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_parsing() {
        assert_eq!(
            "queue 20".parse::<CallbackData>(),
            Ok(CallbackData::QueuePage { offset: 20 })
        );
        assert_eq!(
            "admin set level_threshold".parse::<CallbackData>(),
            Ok(CallbackData::Admin(AdminCallback::Setting(
                SettingKey::LevelThreshold
            )))
        );
        assert_eq!(
            "admin user add_points".parse::<CallbackData>(),
            Ok(CallbackData::Admin(AdminCallback::User(UserAction::AddPoints)))
        );

        for bad in [
            "",
            "queue",
            "queue -10",
            "queue ten",
            "queue 10 20",
            "admin",
            "admin set",
            "admin set nonsense",
            "admin user nuke",
            "admin launch_missiles",
            "queue_next_10",
        ] {
            assert!(bad.parse::<CallbackData>().is_err(), "{bad}");
        }
    }

    #[test]
    fn callback_data_fits_telegram_limit() {
        let mut all = vec![
            CallbackData::QueuePage { offset: i64::MAX },
            CallbackData::Admin(AdminCallback::ConfirmClearQueue),
        ];
        all.extend(SettingKey::ALL.map(|x| CallbackData::Admin(AdminCallback::Setting(x))));
        all.extend(UserAction::ALL.map(|x| CallbackData::Admin(AdminCallback::User(x))));

        for data in all {
            let text = data.to_string();
            assert!(text.len() <= 64, "{text}");
            assert_eq!(text.parse::<CallbackData>(), Ok(data));
        }
    }
}
