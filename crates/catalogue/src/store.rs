//! Read-only accessor over the relational film catalogue.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::error::{CatalogueError, Result};
use crate::types::{CastMember, Collection, CrewMember, Film, FilmDetails, FilmId, GenreMap};

/// Read-only accessor over the relational film catalogue.
///
/// One `CatalogueStore` is opened at process start and shared across games
/// (§5: the store is read-only after initialisation and safe to share). The
/// details cache grows monotonically for the lifetime of the store; there is
/// no invalidation.
pub struct CatalogueStore {
    conn: Connection,
    details_cache: RefCell<HashMap<FilmId, FilmDetails>>,
}

impl CatalogueStore {
    /// Open the catalogue at `path` with read-only, speed-favouring pragmas.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| CatalogueError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Wrap an already-open connection (used by tests and in-memory fixtures).
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA synchronous = OFF;
             PRAGMA journal_mode = MEMORY;
             PRAGMA temp_store = MEMORY;
             PRAGMA cache_size = 10000;",
        )?;

        let has_movies: bool = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='movies'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .unwrap_or(false);
        if !has_movies {
            return Err(CatalogueError::Unavailable(
                "catalogue is missing the required 'movies' table".into(),
            ));
        }

        Ok(Self {
            conn,
            details_cache: RefCell::new(HashMap::new()),
        })
    }

    /// Load the genre id/name bijection. Degrades to an empty map if the
    /// `genres` table is absent.
    pub fn load_genres(&self) -> Result<GenreMap> {
        let has_genres: bool = self
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='genres'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .unwrap_or(false);
        if !has_genres {
            warn!("catalogue has no genres table; genre map is empty");
            return Ok(GenreMap::default());
        }

        let mut stmt = self.conn.prepare("SELECT id, name FROM genres")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        Ok(GenreMap::from_pairs(pairs))
    }

    /// Load every film, ordered by descending popularity, with each film's
    /// genre-id set populated in a single bulk-joined scan.
    pub fn discover_films(&self, limit: Option<usize>) -> Result<Vec<Film>> {
        let limit_clause = match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        };
        let sql = format!(
            "SELECT id, title, release_date, popularity, vote_average, vote_count,
                    runtime, budget, revenue, original_language,
                    collection_id, collection_name
             FROM movies
             ORDER BY popularity DESC{}",
            limit_clause
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut films: Vec<Film> = stmt
            .query_map([], |row| {
                let release_date: Option<String> = row.get(2)?;
                let collection_id: Option<u32> = row.get(10)?;
                let collection_name: Option<String> = row.get(11)?;
                Ok(Film {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    year: release_date.and_then(|d| parse_year(&d)),
                    popularity: row.get(3)?,
                    vote_average: row.get(4)?,
                    vote_count: row.get(5)?,
                    runtime: row.get(6)?,
                    budget: row.get::<_, Option<i64>>(7)?.map(|v| v.max(0) as u64),
                    revenue: row.get::<_, Option<i64>>(8)?.map(|v| v.max(0) as u64),
                    original_language: row.get(9)?,
                    genre_ids: HashSet::new(),
                    collection: match (collection_id, collection_name) {
                        (Some(id), Some(name)) => Some(Collection { id, name }),
                        _ => None,
                    },
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        debug!(count = films.len(), "discovered films from catalogue");

        let mut genre_by_film: HashMap<FilmId, HashSet<u32>> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT movie_id, genre_id FROM movie_genres")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, FilmId>(0)?, row.get::<_, u32>(1)?))
            })?;
            for row in rows {
                let (movie_id, genre_id) = row?;
                genre_by_film.entry(movie_id).or_default().insert(genre_id);
            }
        }

        for film in &mut films {
            if let Some(genres) = genre_by_film.remove(&film.id) {
                film.genre_ids = genres;
            }
        }

        Ok(films)
    }

    /// Load extended, lazily needed attributes for one film, memoised for
    /// the lifetime of the store.
    pub fn details(&self, film_id: FilmId) -> Result<FilmDetails> {
        if let Some(cached) = self.details_cache.borrow().get(&film_id) {
            return Ok(cached.clone());
        }

        let keywords = self.load_keywords(film_id)?;
        let cast = self.load_cast(film_id)?;
        let crew = self.load_crew(film_id)?;
        let countries = self.load_countries(film_id)?;

        let details = FilmDetails {
            keywords,
            cast,
            crew,
            countries,
        };
        self.details_cache
            .borrow_mut()
            .insert(film_id, details.clone());
        Ok(details)
    }

    fn load_keywords(&self, film_id: FilmId) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT k.name FROM keywords k
             JOIN movie_keywords mk ON mk.keyword_id = k.id
             WHERE mk.movie_id = ?1",
        )?;
        let rows = stmt.query_map([film_id], |row| row.get::<_, String>(0))?;
        let mut out = HashSet::new();
        for row in rows {
            out.insert(row?);
        }
        Ok(out)
    }

    fn load_cast(&self, film_id: FilmId) -> Result<Vec<CastMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT mc.person_id, p.name, mc.character, mc.cast_order
             FROM movie_cast mc
             JOIN people p ON p.id = mc.person_id
             WHERE mc.movie_id = ?1
             ORDER BY mc.cast_order ASC",
        )?;
        let rows = stmt.query_map([film_id], |row| {
            Ok(CastMember {
                person_id: row.get(0)?,
                person_name: row.get(1)?,
                character: row.get(2)?,
                order: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<_>>().map_err(Into::into)
    }

    fn load_crew(&self, film_id: FilmId) -> Result<Vec<CrewMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT mc.person_id, p.name, mc.job, mc.department
             FROM movie_crew mc
             JOIN people p ON p.id = mc.person_id
             WHERE mc.movie_id = ?1",
        )?;
        let rows = stmt.query_map([film_id], |row| {
            Ok(CrewMember {
                person_id: row.get(0)?,
                person_name: row.get(1)?,
                job: row.get(2)?,
                department: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<_>>().map_err(Into::into)
    }

    fn load_countries(&self, film_id: FilmId) -> Result<HashSet<String>> {
        let countries_json: Option<String> = self
            .conn
            .query_row(
                "SELECT countries_json FROM movies WHERE id = ?1",
                [film_id],
                |row| row.get(0),
            )
            .ok()
            .flatten();

        Ok(match countries_json {
            Some(raw) => parse_countries_json(&raw),
            None => HashSet::new(),
        })
    }
}

/// `release_date` is stored as an ISO-ish `YYYY-MM-DD` string; pull the year.
fn parse_year(release_date: &str) -> Option<u16> {
    release_date.get(0..4).and_then(|y| y.parse().ok())
}

/// Minimal parser for a JSON array of country-code strings, avoiding a
/// full JSON dependency for a single narrow field.
fn parse_countries_json(raw: &str) -> HashSet<String> {
    raw.trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;
    use rusqlite::params;

    fn seed() -> CatalogueStore {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO movies (id, title, release_date, popularity, vote_average,
                vote_count, runtime, budget, revenue, original_language,
                collection_id, collection_name, countries_json)
             VALUES
             (1, 'Alpha', '2012-01-01', 50.0, 7.5, 100, 120, 1000, 2000, 'en', NULL, NULL, '[\"US\"]'),
             (2, 'Beta',  '1995-06-01', 10.0, 6.0, 40,  90,  NULL, NULL, 'fr', NULL, NULL, NULL),
             (3, 'Gamma', '2020-09-09', 80.0, 8.1, 500, 140, 5000, 9000, 'en', 1, 'Gamma Saga', '[\"US\",\"GB\"]')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO genres (id, name) VALUES (1, 'Action'), (2, 'Drama')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO movie_genres (movie_id, genre_id) VALUES (1, 1), (3, 1), (3, 2)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO people (id, name) VALUES (1, 'Jane Director'), (2, 'Alan Actor')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO movie_cast (movie_id, person_id, character, cast_order)
             VALUES (1, 2, 'Hero', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO movie_crew (movie_id, person_id, job, department)
             VALUES (1, 1, 'Director', 'Directing')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO keywords (id, name) VALUES (1, 'heist')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO movie_keywords (movie_id, keyword_id) VALUES (1, 1)",
            params![],
        )
        .unwrap();

        CatalogueStore::from_connection(conn).unwrap()
    }

    #[test]
    fn discover_films_orders_by_popularity_and_fills_genres() {
        let store = seed();
        let films = store.discover_films(None).unwrap();
        assert_eq!(films.iter().map(|f| f.id).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(films[0].genre_ids, HashSet::from([1, 2]));
        assert_eq!(films[1].year, Some(2012));
        assert_eq!(films[2].budget, None);
    }

    #[test]
    fn details_are_memoised() {
        let store = seed();
        let d1 = store.details(1).unwrap();
        assert!(d1.keywords.contains("heist"));
        assert_eq!(d1.cast.len(), 1);
        assert_eq!(d1.crew[0].job, "Director");
        assert_eq!(d1.countries, HashSet::from(["US".to_string()]));

        let d2 = store.details(1).unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn load_genres_builds_bijection() {
        let store = seed();
        let genres = store.load_genres().unwrap();
        assert_eq!(genres.name_of(1), Some("Action"));
        assert_eq!(genres.id_of("Drama"), Some(2));
    }

    #[test]
    fn missing_movies_table_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        match CatalogueStore::from_connection(conn) {
            Err(CatalogueError::Unavailable(_)) => {}
            Err(other) => panic!("expected Unavailable, got {other}"),
            Ok(_) => panic!("expected an error, got Ok"),
        }
    }

    #[test]
    fn missing_genres_table_degrades_to_empty_map() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE movies (id INTEGER PRIMARY KEY, title TEXT);")
            .unwrap();
        let store = CatalogueStore::from_connection(conn).unwrap();
        assert!(store.load_genres().unwrap().is_empty());
    }
}
