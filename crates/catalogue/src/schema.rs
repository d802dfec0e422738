//! The relational schema this crate expects to find in the catalogue database.
//!
//! `ensure_schema` is only used by tests and by callers building a fresh
//! database; production callers point at an already-populated file and never
//! run DDL against it (ingestion is an external collaborator).

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    id                  INTEGER PRIMARY KEY,
    title               TEXT NOT NULL,
    release_date        TEXT,
    popularity          REAL NOT NULL DEFAULT 0,
    vote_average        REAL NOT NULL DEFAULT 0,
    vote_count          INTEGER NOT NULL DEFAULT 0,
    runtime             INTEGER,
    budget              INTEGER,
    revenue             INTEGER,
    original_language   TEXT NOT NULL DEFAULT '',
    collection_id       INTEGER,
    collection_name     TEXT,
    countries_json      TEXT
);

CREATE TABLE IF NOT EXISTS genres (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS movie_genres (
    movie_id INTEGER NOT NULL,
    genre_id INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_movie_genres_movie ON movie_genres(movie_id);

CREATE TABLE IF NOT EXISTS keywords (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS movie_keywords (
    movie_id   INTEGER NOT NULL,
    keyword_id INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_movie_keywords_movie ON movie_keywords(movie_id);

CREATE TABLE IF NOT EXISTS people (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS movie_cast (
    movie_id   INTEGER NOT NULL,
    person_id  INTEGER NOT NULL,
    character  TEXT NOT NULL DEFAULT '',
    cast_order INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_movie_cast_movie ON movie_cast(movie_id);

CREATE TABLE IF NOT EXISTS movie_crew (
    movie_id   INTEGER NOT NULL,
    person_id  INTEGER NOT NULL,
    job        TEXT NOT NULL DEFAULT '',
    department TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_movie_crew_movie ON movie_crew(movie_id);
"#;

/// Create the schema in `conn` if it does not already exist. Used by tests
/// and by anything building a throwaway in-memory catalogue.
pub fn ensure_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
