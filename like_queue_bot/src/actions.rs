use html_escape::encode_text;
use teloxide::{payloads::SendMessageSetters, requests::Requester, types::ParseMode, Bot};

use crate::{database::Database, Error};

/// Text of an announcement as users get it.
fn announcement_text(text: &str) -> String {
    format!("📢 <b>ANNOUNCEMENT</b>\n\n{}", encode_text(text))
}

/// Send an announcement to everyone who ever talked to the bot, one by one.
///
/// Users the bot can't reach (like those who blocked it) are logged and
/// skipped. Returns how many got it.
pub async fn broadcast_announcement(bot: &Bot, db: &Database, text: &str) -> Result<usize, Error> {
    let message = announcement_text(text);
    let users = db.all_user_ids().await?;

    let mut sent = 0;
    for user in &users {
        match bot
            .send_message(*user, message.clone())
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(_) => sent += 1,
            Err(e) => log::warn!("Failed to send the announcement to {user}: {e}"),
        }
    }

    log::info!("Sent the announcement to {sent} of {} users.", users.len());
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcements_are_escaped() {
        assert_eq!(
            announcement_text("New <rules> & stuff"),
            "📢 <b>ANNOUNCEMENT</b>\n\nNew &lt;rules&gt; &amp; stuff"
        );
    }
}
