//! Source code for Like Queue Bot: a Telegram bot keeping a queue of TikTok
//! videos, where users have to like a few videos of others before they're
//! allowed to add their own, and collect points and levels for it.

/// Configuration read at start-up.
mod config;
pub use config::{Config, ConfigError};

/// The error type.
mod error;
pub use error::Error;

/// Runtime-tunable settings stored in the database.
mod settings;

/// Points, levels and bonuses.
mod scoring;

/// Validation of submitted links.
mod links;

/// The database.
mod database;

/// Command rate limiting.
mod spam_guard;

/// State of unfinished admin prompts.
mod conversation;

/// Various types used throughout.
mod types;

/// Shared state handed to every handler.
mod app;

/// Functions that perform stuff via the bot.
mod actions;

/// Functions that handle events from Telegram.
mod handlers;

/// Entry function that starts the bot.
mod entry;
pub use entry::*;

/// How many videos are shown per queue page.
pub const QUEUE_PAGE_SIZE: i64 = 10;

/// How many users are shown on the leaderboard.
pub const LEADERBOARD_SIZE: i64 = 10;
