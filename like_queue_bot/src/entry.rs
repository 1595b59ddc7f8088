use std::sync::Arc;
use teloxide::{dptree::deps, prelude::*};

use crate::{
    app::App,
    database::Database,
    handlers::{commands::Command, handle_callback_query, handle_message},
    Config,
};

/// # Panics
///
/// Panics if there's no bot token, or if the database can't be opened.
pub async fn entry() {
    let config = Config::load().expect("Could not load the configuration!");

    let bot = Bot::new(config.bot_token.clone());

    bot.set_my_commands(Command::generate_bot_commands())
        .await
        .expect("Failed to set bot commands!");

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to open the database!");

    let app = Arc::new(App::new(db, config));

    log::info!("Creating the handler...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback_query));

    log::info!("Dispatching the dispatcher!");

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("it appears we have been bonked.");
}
