use teloxide::types::UserId;

use crate::settings::SettingKey;

/// Failures that are not the user's fault. Anything the user did wrong is
/// reported through outcome types like [`LikeOutcome`] instead.
///
/// [`LikeOutcome`]: crate::database::LikeOutcome
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
    #[error("setting {0} is missing from the database")]
    MissingSetting(SettingKey),
    #[error("setting {key} has a malformed value {value:?}")]
    MalformedSetting { key: SettingKey, value: String },
    #[error("user {0} is not registered")]
    UnknownUser(UserId),
}
