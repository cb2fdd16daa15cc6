//! User input parsing for the interactive shells

/// Shell commands recognised on any prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Undo,
    Moves,
    Help,
    Menu,
    Hint,
    Solution,
    /// Engine's best move for the current position
    Best,
    /// Detailed evaluation of the current position
    Eval,
}

impl Command {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "quit" | "exit" => Some(Command::Quit),
            "undo" => Some(Command::Undo),
            "moves" => Some(Command::Moves),
            "help" => Some(Command::Help),
            "menu" => Some(Command::Menu),
            "hint" => Some(Command::Hint),
            "solution" => Some(Command::Solution),
            "best" => Some(Command::Best),
            "eval" => Some(Command::Eval),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Command(Command),
    /// Anything else is treated as a move (or square) attempt, case preserved
    Move(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Empty;
        }
        match Command::from_word(&trimmed.to_ascii_lowercase()) {
            Some(command) => Input::Command(command),
            None => Input::Move(trimmed.to_string()),
        }
    }
}
