//! Error types for the catalogue crate.

use thiserror::Error;

/// Errors that can occur while opening or querying the catalogue store.
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// The store could not be opened, or is missing its required `movies` table.
    #[error("catalogue unavailable: {0}")]
    Unavailable(String),

    /// A query against an open store failed.
    #[error("catalogue query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, CatalogueError>;
