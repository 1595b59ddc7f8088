use std::{collections::HashMap, fmt::Display, str::FromStr};

use teloxide::types::UserId;
use tokio::sync::Mutex;

use crate::settings::SettingKey;

/// Things an admin can do to a user, once they said which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    MakeAdmin,
    ResetLikes,
    AddPoints,
    SetLevel,
    Block,
}

impl UserAction {
    pub const ALL: [UserAction; 5] = [
        UserAction::MakeAdmin,
        UserAction::ResetLikes,
        UserAction::AddPoints,
        UserAction::SetLevel,
        UserAction::Block,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserAction::MakeAdmin => "make_admin",
            UserAction::ResetLikes => "reset_likes",
            UserAction::AddPoints => "add_points",
            UserAction::SetLevel => "set_level",
            UserAction::Block => "block",
        }
    }

    /// Text for the button in the admin panel.
    #[must_use]
    pub fn button(self) -> &'static str {
        match self {
            UserAction::MakeAdmin => "👑 Make admin",
            UserAction::ResetLikes => "🔄 Reset likes",
            UserAction::AddPoints => "➕ Add points",
            UserAction::SetLevel => "🔼 Set level",
            UserAction::Block => "🚫 Block",
        }
    }
}

impl Display for UserAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or(())
    }
}

/// What the bot is waiting for an admin to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    VideoToDelete,
    Announcement,
    SettingValue(SettingKey),
    TargetUser(UserAction),
    PointsFor(UserId),
    LevelFor(UserId),
}

impl PendingInput {
    /// Message asking the admin for the input.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            PendingInput::VideoToDelete => {
                "Send the number of the video to remove from the queue.".to_string()
            }
            PendingInput::Announcement => {
                "Send the text of the announcement for all users.".to_string()
            }
            PendingInput::SettingValue(key) => format!("Send the new value for \"{}\".", key.title()),
            PendingInput::TargetUser(action) => match action {
                UserAction::MakeAdmin => "Send the ID of the user to make an admin.",
                UserAction::ResetLikes => "Send the ID of the user whose likes to reset.",
                UserAction::AddPoints => "Send the ID of the user to give points to.",
                UserAction::SetLevel => "Send the ID of the user whose level to change.",
                UserAction::Block => "Send the ID of the user to block.",
            }
            .to_string(),
            PendingInput::PointsFor(user) => {
                format!("Send the amount of points to give to user {user}.")
            }
            PendingInput::LevelFor(user) => format!("Send the new level for user {user}."),
        }
    }
}

/// Prompts admins haven't answered yet. An admin has at most one.
#[derive(Debug, Default)]
pub struct Conversations {
    pending: Mutex<HashMap<UserId, PendingInput>>,
}

impl Conversations {
    /// Start waiting for `input` from `admin`, replacing whatever was
    /// waited for before.
    pub async fn begin(&self, admin: UserId, input: PendingInput) {
        self.pending.lock().await.insert(admin, input);
    }

    /// Stop waiting for input from `admin`, and return what was waited for.
    pub async fn take(&self, admin: UserId) -> Option<PendingInput> {
        self.pending.lock().await.remove(&admin)
    }
}
