//! The five-value answer alphabet.

/// A player's answer to a question. `Undo` is a sixth input handled
/// entirely by the session layer (a history-snapshot pop); it never reaches
/// the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unknown,
    ProbablyYes,
    ProbablyNo,
}

impl Answer {
    /// Parses the original five-code UI alphabet (`y`/`n`/`?`/`py`/`pn`).
    /// This is the session/CLI boundary's `InvalidAnswer` rejection point —
    /// once a caller holds an `Answer`, it is by construction valid.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "y" => Some(Answer::Yes),
            "n" => Some(Answer::No),
            "?" => Some(Answer::Unknown),
            "py" => Some(Answer::ProbablyYes),
            "pn" => Some(Answer::ProbablyNo),
            _ => None,
        }
    }
}
