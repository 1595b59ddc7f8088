use std::env;

use teloxide::types::UserId;

const DEFAULT_DATABASE_URL: &str = "sqlite:like_queue.sqlite";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no BOT_TOKEN set and the key file could not be read: {0}")]
    NoToken(#[source] std::io::Error),
    #[error("ADMIN_IDS contains {0:?}, which is not a user ID")]
    BadAdminId(String),
}

/// Things that are decided once at start-up. Everything that admins can
/// change at runtime lives in [`Settings`](crate::settings::Settings) instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// `sqlx` URL of the SQLite database, like `sqlite:like_queue.sqlite`.
    pub database_url: String,
    /// Users that are always admins, whatever the database says.
    pub admin_ids: Vec<UserId>,
}

impl Config {
    /// Read the configuration from the environment, and a `.env` file if there is one.
    ///
    /// The bot token is taken from `BOT_TOKEN`, or from the key file if that's not set.
    ///
    /// # Errors
    ///
    /// Errors if there's no bot token anywhere or if `ADMIN_IDS` is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Failed to read the .env file: {e}");
            }
        }

        let bot_token = match env::var("BOT_TOKEN") {
            Ok(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => bot_commons::load_bot_key().map_err(ConfigError::NoToken)?,
        };

        let database_url = env::var("DB_FILE")
            .ok()
            .filter(|x| !x.trim().is_empty())
            .map_or_else(|| DEFAULT_DATABASE_URL.to_string(), |x| database_url(x.trim()));

        let admin_ids = parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default())?;

        log::info!("Database: {database_url}");
        log::info!("Static admins: {}", admin_ids.len());

        Ok(Config {
            bot_token,
            database_url,
            admin_ids,
        })
    }

    /// Returns true if this user is on the static admin list.
    #[must_use]
    pub fn is_static_admin(&self, user: UserId) -> bool {
        self.admin_ids.contains(&user)
    }
}

/// Accepts both plain file names and full `sqlite:` URLs.
fn database_url(file: &str) -> String {
    if file.starts_with("sqlite:") {
        file.to_string()
    } else {
        format!("sqlite:{file}")
    }
}

/// Parses a comma separated list of user IDs. Empty entries are skipped.
fn parse_admin_ids(list: &str) -> Result<Vec<UserId>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(|x| {
            x.parse()
                .map(UserId)
                .map_err(|_| ConfigError::BadAdminId(x.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_id_list() {
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<UserId>::new());
        assert_eq!(
            parse_admin_ids(" 12, 34 ,,56").unwrap(),
            vec![UserId(12), UserId(34), UserId(56)]
        );
        assert!(matches!(
            parse_admin_ids("12,abc"),
            Err(ConfigError::BadAdminId(x)) if x == "abc"
        ));
    }

    #[test]
    fn database_urls() {
        assert_eq!(database_url("queue.db"), "sqlite:queue.db");
        assert_eq!(database_url("sqlite:queue.db"), "sqlite:queue.db");
    }
}
