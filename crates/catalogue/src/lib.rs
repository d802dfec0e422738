//! Read-only accessor over the relational film catalogue.
//!
//! This crate owns the data, not the game: it loads films, the genre
//! bijection, and per-film extended details (keywords, cast, crew,
//! countries, collection) with a memoising cache and no game logic.

pub mod error;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{CatalogueError, Result};
pub use store::CatalogueStore;
pub use types::{CastMember, Collection, CrewMember, Film, FilmDetails, FilmId, GenreMap};
