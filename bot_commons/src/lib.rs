//! Bits shared between bots: start-up boilerplate, bot key loading and
//! picking commands out of message text.

use std::future::Future;

pub mod commands;

/// Initialize logging and start the `closure` in an async runtime.
/// Logging is enabled by default on level `info` unless overridden
/// by environment variable `RUST_LOG`. This uses the crate
/// [pretty_env_logger][] internally, see its documentation for more details.
///
/// # Panics
///
/// Panics if the async runtime can't be built.
///
/// [pretty_env_logger]: https://docs.rs/pretty_env_logger
pub fn start_everything(closure: impl Future<Output = ()>) {
    let log_level = std::env::var_os("RUST_LOG")
        .unwrap_or_else(|| std::ffi::OsString::from("info"))
        .into_string()
        .unwrap_or_else(|_| String::from("info"));

    // journald timestamps everything on its own.
    let running_as_systemd_service = std::env::var_os("JOURNAL_STREAM").is_some();

    let mut builder = match running_as_systemd_service {
        true => pretty_env_logger::formatted_builder(),
        false => pretty_env_logger::formatted_timed_builder(),
    };

    builder.parse_filters(&log_level);

    if builder.try_init().is_err() {
        log::error!("Tried to init logger twice!");
    }

    log::info!("Starting up with log filter \"{log_level}\".");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build the async runtime!")
        .block_on(closure);
}

/// Name of the file the bot key is read from: `key_debug` in debug builds,
/// `key` otherwise.
#[must_use]
pub fn key_file_name() -> &'static str {
    match cfg!(debug_assertions) {
        true => "key_debug",
        false => "key",
    }
}

/// Read the bot key from [`key_file_name`], with surrounding whitespace
/// (like a trailing newline left by an editor) trimmed off.
///
/// # Errors
///
/// Errors if the file can't be read.
pub fn load_bot_key() -> std::io::Result<String> {
    let key = std::fs::read_to_string(key_file_name())?;
    Ok(key.trim().to_string())
}
