use teloxide::types::UserId;

use crate::{conversation::Conversations, database::Database, Config, Error};

pub struct App {
    pub db: Database,
    pub config: Config,
    pub conversations: Conversations,
}

impl App {
    #[must_use]
    pub fn new(db: Database, config: Config) -> App {
        App {
            db,
            config,
            conversations: Conversations::default(),
        }
    }

    /// Admins are the ones listed in the configuration, plus whoever has the
    /// admin flag in the database.
    pub async fn is_admin(&self, user: UserId) -> Result<bool, Error> {
        if self.config.is_static_admin(user) {
            return Ok(true);
        }
        self.db.is_admin(user).await
    }

    /// An app on an empty in-memory database, with user 1 as the only
    /// static admin.
    #[cfg(test)]
    pub async fn for_tests() -> App {
        let config = Config {
            bot_token: String::new(),
            database_url: String::new(),
            admin_ids: vec![UserId(1)],
        };
        App::new(Database::in_memory().await.unwrap(), config)
    }
}
