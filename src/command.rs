//! REPL commands and their prefix-matching parser.
//!
//! Every command has a canonical lowercase name. Users may type any
//! non-empty prefix of a name, so the names must keep pairwise-distinct
//! first letters for one-letter shortcuts to stay unambiguous.
use std::fmt;

// ============================================================================
// Command Enum
// ============================================================================

/// Actions the user can take on the current saved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Archive,
    Delete,
    Favorite,
    Next,
    Quit,
}

impl Command {
    /// All commands in matching order.
    pub const ALL: [Command; 5] = [
        Command::Archive,
        Command::Delete,
        Command::Favorite,
        Command::Next,
        Command::Quit,
    ];

    /// Canonical user-facing name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Delete => "delete",
            Self::Favorite => "favorite",
            Self::Next => "next",
            Self::Quit => "quit",
        }
    }

    /// Whether the command ends work on the current item.
    ///
    /// Favorite is the only action that keeps the session on the same item.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Favorite)
    }

    /// Parse user input into a command.
    ///
    /// Input is trimmed and lowercased, then matched against each name in
    /// [`Command::ALL`] order; the first name starting with the input wins.
    /// Empty input never matches (it is a prefix of every name).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name().starts_with(text.as_str()))
    }

    /// Prompt line listing every command with its shortcut letter,
    /// e.g. `(a)rchive (d)elete (f)avorite (n)ext (q)uit: `.
    pub fn prompt() -> String {
        let mut prompt = Self::ALL
            .iter()
            .map(|cmd| {
                let (first, rest) = cmd.name().split_at(1);
                format!("({first}){rest}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        prompt.push_str(": ");
        prompt
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
