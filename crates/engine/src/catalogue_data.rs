//! Bundles the catalogue load with the static question catalogue built from
//! its genre map, so a `Game` can be constructed from one `Rc` handed to
//! every game in the process.

use std::collections::HashMap;

use catalogue::{CatalogueStore, Film, FilmId, GenreMap};
use predicates::Question;

use crate::config::EngineConfig;
use crate::error::Result;

pub struct CatalogueData {
    pub genres: GenreMap,
    pub films: Vec<Film>,
    pub films_by_id: HashMap<FilmId, Film>,
    pub static_questions: Vec<Question>,
}

impl CatalogueData {
    pub fn load(store: &CatalogueStore, config: &EngineConfig) -> Result<Self> {
        let genres = store.load_genres()?;
        let films = store.discover_films(config.catalogue_row_limit)?;
        let films_by_id = films.iter().map(|f| (f.id, f.clone())).collect();
        let static_questions = predicates::catalogue::build_static_catalogue(&genres);

        Ok(Self {
            genres,
            films,
            films_by_id,
            static_questions,
        })
    }

    pub fn films_by_id_refs(&self) -> HashMap<FilmId, &Film> {
        self.films_by_id.iter().map(|(id, f)| (*id, f)).collect()
    }
}
