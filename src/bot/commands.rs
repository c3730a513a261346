//! Bot command parsing

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Id,
    Publicise,
    /// `/feedback <reason>`; the reason is everything after the command token
    Feedback(String),
}

impl Command {
    /// Parse a message text such as `/feedback@MyBot too long`.
    ///
    /// Returns `None` for plain text, for unknown commands and for commands
    /// addressed to another bot through the `@botname` suffix.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;

        let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, args) = rest.split_at(token_end);
        let (name, addressee) = match token.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (token, None),
        };

        if let (Some(addressee), Some(username)) = (addressee, bot_username) {
            if !addressee.eq_ignore_ascii_case(username) {
                return None;
            }
        }

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "id" => Some(Command::Id),
            "publicise" => Some(Command::Publicise),
            "feedback" => Some(Command::Feedback(args.trim().to_string())),
            _ => None,
        }
    }
}
