//! `SessionManager`: an in-process registry of games in progress.
//!
//! Grounded on `examples/original_source/backend/app_akinator.py`'s
//! `game_state: Dict[str, Dict]` registry, generalised into a typed Rust
//! struct that owns one `Game` per session plus an undo stack. This is
//! deliberately not a request router: no HTTP, no background tasks. A
//! caller (the CLI, or an eventual external server) drives the four
//! operations and is responsible for its own concurrency.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use catalogue::CatalogueStore;
use engine::{Answer, CatalogueData, ConfirmOutcome, EngineConfig, EngineState, Game, StepOutcome};
use tracing::{info, instrument, warn};

use crate::error::{Result, SessionError};
use crate::id::{SessionId, SessionIdGenerator};

struct SessionEntry {
    game: Game,
    history: Vec<EngineState>,
    last_touch: Instant,
}

/// Owns every session in the process. One instance is constructed at
/// startup from a shared `CatalogueStore` and handed to the CLI (or, in
/// the future, an external router).
pub struct SessionManager {
    sessions: HashMap<SessionId, SessionEntry>,
    ids: SessionIdGenerator,
    catalogue: Rc<CatalogueData>,
    store: Rc<CatalogueStore>,
    config: EngineConfig,
    session_ttl: Duration,
    history_limit: Option<usize>,
}

impl SessionManager {
    pub fn new(
        catalogue: Rc<CatalogueData>,
        store: Rc<CatalogueStore>,
        config: EngineConfig,
        session_ttl: Duration,
        history_limit: Option<usize>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            ids: SessionIdGenerator::default(),
            catalogue,
            store,
            config,
            session_ttl,
            history_limit,
        }
    }

    /// Starts a new game and returns its id along with the first turn.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(SessionId, StepOutcome)> {
        let mut game = Game::new(self.catalogue.clone(), self.store.clone(), self.config.clone());
        let outcome = game.start()?;
        let id = self.ids.next();
        info!(%id, "session started");
        self.sessions.insert(
            id,
            SessionEntry {
                game,
                history: Vec::new(),
                last_touch: Instant::now(),
            },
        );
        Ok((id, outcome))
    }

    #[instrument(skip(self))]
    pub fn answer(&mut self, id: SessionId, answer: Answer) -> Result<StepOutcome> {
        let history_limit = self.history_limit;
        let entry = self.touch(id)?;
        entry.push_snapshot(history_limit);
        let outcome = entry.game.answer(answer)?;
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn confirm(&mut self, id: SessionId, correct: bool) -> Result<ConfirmOutcome> {
        let history_limit = self.history_limit;
        let entry = self.touch(id)?;
        entry.push_snapshot(history_limit);
        let outcome = entry.game.confirm(correct)?;
        Ok(outcome)
    }

    /// Pops the last snapshot and restores it, returning the turn the
    /// restored state represents.
    #[instrument(skip(self))]
    pub fn undo(&mut self, id: SessionId) -> Result<StepOutcome> {
        let entry = self.touch(id)?;
        let previous = entry.history.pop().ok_or(SessionError::NothingToUndo)?;
        entry.game.state = previous;
        Ok(entry.game.current())
    }

    /// Evicts every session untouched for longer than `session_ttl`. Call
    /// this on a cadence of your choosing (e.g. before `start`); no
    /// background task is spawned here.
    pub fn sweep(&mut self) {
        let ttl = self.session_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_touch.elapsed() < ttl);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            warn!(evicted, "swept expired sessions");
        }
    }

    fn touch(&mut self, id: SessionId) -> Result<&mut SessionEntry> {
        let entry = self.sessions.get_mut(&id).ok_or(SessionError::SessionNotFound)?;
        if entry.last_touch.elapsed() >= self.session_ttl {
            return Err(SessionError::SessionExpired);
        }
        entry.last_touch = Instant::now();
        Ok(entry)
    }
}

impl SessionEntry {
    fn push_snapshot(&mut self, limit: Option<usize>) {
        self.history.push(self.game.state.clone());
        if let Some(limit) = limit {
            while self.history.len() > limit {
                self.history.remove(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue::CatalogueStore as Store;
    use rusqlite::Connection;

    fn seeded_manager() -> SessionManager {
        let conn = Connection::open_in_memory().unwrap();
        catalogue::schema::ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO movies (id, title, release_date, popularity, vote_average,
                vote_count, runtime, budget, revenue, original_language,
                collection_id, collection_name, countries_json)
             VALUES
             (1, 'Alpha', '2012-01-01', 50.0, 7.5, 100, 120, NULL, NULL, 'en', NULL, NULL, NULL),
             (2, 'Beta', '1995-01-01', 10.0, 6.0, 40, 90, NULL, NULL, 'fr', NULL, NULL, NULL)",
            [],
        )
        .unwrap();
        let store = Rc::new(Store::from_connection(conn).unwrap());
        let config = EngineConfig::default();
        let catalogue = Rc::new(CatalogueData::load(&store, &config).unwrap());
        SessionManager::new(catalogue, store, config, Duration::from_secs(3600), Some(50))
    }

    #[test]
    fn unknown_session_is_rejected() {
        let mut manager = seeded_manager();
        let bogus = manager.ids.next();
        match manager.answer(bogus, Answer::Yes) {
            Err(SessionError::SessionNotFound) => {}
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn undo_restores_the_prior_state_bit_for_bit() {
        let mut manager = seeded_manager();
        let (id, outcome) = manager.start().unwrap();
        let before = manager.sessions.get(&id).unwrap().game.state.clone();

        let StepOutcome::Turn(_) = outcome else {
            panic!("expected a question for a two-film catalogue");
        };
        manager.answer(id, Answer::Unknown).unwrap();
        let restored = manager.undo(id).unwrap();

        let after = manager.sessions.get(&id).unwrap().game.state.clone();
        assert_eq!(before.candidates, after.candidates);
        assert_eq!(before.scores.len(), after.scores.len());
        assert_eq!(before.question_count, after.question_count);
        match restored {
            StepOutcome::Turn(_) => {}
            StepOutcome::Terminal(_) => panic!("restored state should still be mid-game"),
        }
    }

    #[test]
    fn undo_with_empty_history_errors() {
        let mut manager = seeded_manager();
        let (id, _) = manager.start().unwrap();
        match manager.undo(id) {
            Err(SessionError::NothingToUndo) => {}
            other => panic!("expected NothingToUndo, got {other:?}"),
        }
    }
}
