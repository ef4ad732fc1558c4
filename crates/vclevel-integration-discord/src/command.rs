//! Text command parsing

use vclevel::ProgressRecord;

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the author's current level and experience
    Level,
}

/// Parse a message into a command.
///
/// Returns `None` when the message does not start with `prefix` or names
/// an unknown command. Command names are case-insensitive.
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    let rest = content.strip_prefix(prefix)?;
    let name = rest.split_whitespace().next()?.to_lowercase();

    match name.as_str() {
        "level" => Some(Command::Level),
        _ => None,
    }
}

/// Reply to the level command
pub fn level_reply(record: &ProgressRecord) -> String {
    format!(
        "You are level **{}** with **{}** exp",
        record.level, record.exp
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_command() {
        assert_eq!(parse_command("!", "!level"), Some(Command::Level));
        assert_eq!(parse_command("!", "!  LEVEL please"), Some(Command::Level));
        assert_eq!(parse_command("vc.", "vc.level"), Some(Command::Level));
    }

    #[test]
    fn test_ignore_other_messages() {
        assert_eq!(parse_command("!", "level"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("!", "!rank"), None);
        assert_eq!(parse_command("!", "?level"), None);
    }

    #[test]
    fn test_level_reply() {
        let record = ProgressRecord {
            id: "1".into(),
            level: 4,
            exp: 32,
        };
        assert_eq!(level_reply(&record), "You are level **4** with **32** exp");
    }
}
