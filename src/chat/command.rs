//! Chat command parsing.

/// A recognised chat command with its whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Greet,
    /// `/add <words…> [YYYY-MM-DD]`
    Create(Vec<String>),
    /// `/list [YYYY-MM-DD]`
    List(Option<String>),
    /// `/today`
    Today,
    /// Any other slash command.
    Unknown(String),
}

impl Command {
    /// Parse a message. Returns `None` for text that is not a command.
    ///
    /// A `@botname` suffix on the command word is ignored, as group chats
    /// append it.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let head = words.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head);
        let args: Vec<String> = words.map(str::to_string).collect();

        Some(match name {
            "start" => Command::Greet,
            "add" => Command::Create(args),
            "list" => Command::List(args.into_iter().next()),
            "today" => Command::Today,
            other => Command::Unknown(other.to_string()),
        })
    }
}
