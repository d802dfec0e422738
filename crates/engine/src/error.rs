//! Error types surfaced by the core engine.

use catalogue::CatalogueError;
use catalogue::FilmId;
use thiserror::Error;

/// Errors the core can raise. `InvalidAnswer` has no variant here: the
/// five-value `Answer` alphabet is enforced by the type system, so an
/// out-of-alphabet input never reaches the engine (see `Answer::from_code`
/// for the session-boundary parse step that does reject one).
#[derive(Error, Debug)]
pub enum EngineError {
    /// The catalogue store could not be opened, or lacks required tables.
    #[error("catalogue unavailable: {0}")]
    CatalogueUnavailable(#[from] CatalogueError),

    /// The selector has no eligible question left, with more than one
    /// candidate remaining. Recoverable at the session layer.
    #[error("no eligible question remains with {} candidates", remaining.len())]
    NoEligibleQuestion { remaining: Vec<FilmId> },

    /// `answer` was called while the game is not in the Asking phase.
    #[error("no question is pending an answer")]
    NoQuestionPending,

    /// `confirm` was called while the game is not in the Guessing phase.
    #[error("no guess is pending confirmation")]
    NoGuessPending,

    /// The game has already reached a terminal state.
    #[error("the game has already ended")]
    GameOver,
}

pub type Result<T> = std::result::Result<T, EngineError>;
