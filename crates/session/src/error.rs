//! Errors the session layer can raise on top of the core engine's.

use engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no session found with that id")]
    SessionNotFound,

    #[error("session expired after being idle past its ttl")]
    SessionExpired,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
