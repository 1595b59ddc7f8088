use teloxide::types::Message;

/// A bot command as it was typed in a message, split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandText<'a> {
    /// Command name without the leading `/` and without the `@botname` suffix.
    ///
    /// If the input is `/Hewwo@SomeBot everypony bazinga`, this is `Hewwo`.
    pub name: &'a str,
    /// Everything after the command, with leading whitespace trimmed.
    ///
    /// If the input is `/Hewwo everypony bazinga`, this is `everypony bazinga`.
    pub params: &'a str,
}

/// Split `text` into a command and its parameters.
///
/// Returns [`None`] if the text is not a command, or if it's a command
/// addressed to some other bot, like `/start@SomeOtherBot`.
#[must_use]
pub fn parse_command<'a>(text: &'a str, bot_username: &str) -> Option<CommandText<'a>> {
    let rest = text.strip_prefix('/')?;

    let command_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let command = &rest[..command_len];

    if command.is_empty() || !command.is_ascii() {
        // Telegram commands must be ASCII.
        // See https://core.telegram.org/bots/api#botcommand
        return None;
    }

    // If the command is "/queue@Like_Queue_Bot", trim the "@" and everything
    // after it, but only if the username is actually ours.
    let name = match command.split_once('@') {
        Some((name, username)) => {
            // Bot names are guaranteed ASCII, so ignore ASCII case specifically.
            if !username.eq_ignore_ascii_case(bot_username) {
                return None;
            }
            name
        }
        None => command,
    };

    if name.is_empty() {
        return None;
    }

    let params = rest[command_len..].trim_start();

    Some(CommandText { name, params })
}

pub trait MessageStuff {
    /// Text of the message, or its caption if it's media.
    fn text_full(&self) -> Option<&str>;
    /// Parse this message as a command addressed to the bot named `bot_username`.
    fn command(&self, bot_username: &str) -> Option<CommandText<'_>>;
}

impl MessageStuff for Message {
    fn text_full(&self) -> Option<&str> {
        self.text().or_else(|| self.caption())
    }
    fn command(&self, bot_username: &str) -> Option<CommandText<'_>> {
        parse_command(self.text_full()?, bot_username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_command() {
        let cmd = parse_command("/like 42", "Some_Bot").unwrap();
        assert_eq!(cmd.name, "like");
        assert_eq!(cmd.params, "42");

        let cmd = parse_command("/queue", "Some_Bot").unwrap();
        assert_eq!(cmd.name, "queue");
        assert_eq!(cmd.params, "");
    }

    #[test]
    fn command_with_username() {
        let cmd = parse_command("/submit@some_bot   https://example.com/", "Some_Bot").unwrap();
        assert_eq!(cmd.name, "submit");
        assert_eq!(cmd.params, "https://example.com/");

        assert_eq!(parse_command("/submit@OtherBot hi", "Some_Bot"), None);
    }

    #[test]
    fn not_commands() {
        assert_eq!(parse_command("hello /like 3", "Some_Bot"), None);
        assert_eq!(parse_command("/", "Some_Bot"), None);
        assert_eq!(parse_command("/ like", "Some_Bot"), None);
        assert_eq!(parse_command("/лайк 3", "Some_Bot"), None);
        assert_eq!(parse_command("/@Some_Bot", "Some_Bot"), None);
    }

    #[test]
    fn multiline_params() {
        let cmd = parse_command("/say\nhello\nworld", "Some_Bot").unwrap();
        assert_eq!(cmd.name, "say");
        assert_eq!(cmd.params, "hello\nworld");
    }
}
