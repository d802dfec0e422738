//! `EngineState`: the mutable game state, and the invariants it must hold.

use std::collections::{HashMap, HashSet, VecDeque};

use catalogue::{Film, FilmId};
use predicates::{Question, Tag};

const RECENT_TYPES_CAP: usize = 10;

/// Which state the game is in, per the state-transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Asking,
    Guessing,
    Terminal(TerminalOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    Success,
    Failure,
}

/// The mutable game state. Cheap to clone: every field is small or
/// reference-free, which is what makes the undo stack (a `Vec<EngineState>`
/// snapshot history, owned by the session layer) affordable.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub phase: Phase,
    /// Ordered by `(-score, -popularity)`, re-sorted after every mutation.
    pub candidates: Vec<FilmId>,
    pub scores: HashMap<FilmId, f32>,
    pub strikes: HashMap<FilmId, u8>,
    pub asked: HashSet<String>,
    pub question_count: u32,
    pub guess_cooldown: u32,
    pub top_streak: (Option<FilmId>, u32),
    pub consecutive_guesses: u32,
    pub recent_types: VecDeque<Tag>,
    /// The question the player is currently being asked, if any.
    pub pending_question: Option<Question>,
    /// The film proposed for confirmation, if the game is in `Guessing`.
    pub pending_guess: Option<FilmId>,
    /// Set when the escape hatch forced the pending question, so the
    /// consecutive-guess counter can be reset once it's answered.
    pub escape_hatch_pending: bool,
}

impl EngineState {
    /// Creates the initial state for a new game: Asking, full catalogue as
    /// candidates, all scores at zero.
    pub fn init(films: &[Film]) -> Self {
        let mut candidates: Vec<FilmId> = films.iter().map(|f| f.id).collect();
        let scores: HashMap<FilmId, f32> = candidates.iter().map(|&id| (id, 0.0)).collect();
        let strikes: HashMap<FilmId, u8> = candidates.iter().map(|&id| (id, 0)).collect();

        let film_by_id: HashMap<FilmId, &Film> = films.iter().map(|f| (f.id, f)).collect();
        candidates.sort_by(|a, b| cmp_candidates(*a, *b, &scores, &film_by_id));

        Self {
            phase: Phase::Asking,
            candidates,
            scores,
            strikes,
            asked: HashSet::new(),
            question_count: 0,
            guess_cooldown: 0,
            top_streak: (None, 0),
            consecutive_guesses: 0,
            recent_types: VecDeque::with_capacity(RECENT_TYPES_CAP),
            pending_question: None,
            pending_guess: None,
            escape_hatch_pending: false,
        }
    }

    /// Re-sorts `candidates` by `(-score, -popularity)`. Stable, so ties
    /// keep their relative order (insertion order at construction time).
    pub fn resort(&mut self, films: &HashMap<FilmId, &Film>) {
        let scores = &self.scores;
        self.candidates
            .sort_by(|a, b| cmp_candidates(*a, *b, scores, films));
    }

    /// Drops `film_id` from candidates, scores, and strikes together, per
    /// the invariant that a film dropped from one is dropped from all three.
    pub fn purge(&mut self, film_id: FilmId) {
        self.candidates.retain(|&id| id != film_id);
        self.scores.remove(&film_id);
        self.strikes.remove(&film_id);
        if self.top_streak.0 == Some(film_id) {
            self.top_streak = (None, 0);
        }
    }

    pub fn score_of(&self, film_id: FilmId) -> f32 {
        self.scores.get(&film_id).copied().unwrap_or(0.0)
    }

    pub fn top(&self) -> Option<FilmId> {
        self.candidates.first().copied()
    }

    pub fn second(&self) -> Option<FilmId> {
        self.candidates.get(1).copied()
    }

    /// Updates the top-position streak after a re-sort.
    pub fn update_streak(&mut self) {
        match self.top() {
            Some(top) if self.top_streak.0 == Some(top) => {
                self.top_streak.1 += 1;
            }
            Some(top) => {
                self.top_streak = (Some(top), 1);
            }
            None => {
                self.top_streak = (None, 0);
            }
        }
    }

    /// Records a question's category tag, trimming to the last 10.
    pub fn record_recent_type(&mut self, tag: Tag) {
        if self.recent_types.len() == RECENT_TYPES_CAP {
            self.recent_types.pop_front();
        }
        self.recent_types.push_back(tag);
    }

    /// Checks the invariants §3/§8 require after every mutation. Debug-only;
    /// panics (rather than returning an error) since a violation is a
    /// programming bug in the core, not a runtime condition a caller can act
    /// on.
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self, films: &HashMap<FilmId, &Film>) {
        let candidate_set: HashSet<FilmId> = self.candidates.iter().copied().collect();
        for id in self.scores.keys() {
            debug_assert!(candidate_set.contains(id), "score for non-candidate film {id}");
        }
        for id in self.strikes.keys() {
            debug_assert!(candidate_set.contains(id), "strikes for non-candidate film {id}");
        }
        let mut sorted = self.candidates.clone();
        sorted.sort_by(|a, b| cmp_candidates(*a, *b, &self.scores, films));
        debug_assert_eq!(
            scoring_key_sequence(&self.candidates, &self.scores, films),
            scoring_key_sequence(&sorted, &self.scores, films),
            "candidates are not sorted by (-score, -popularity)"
        );
        if let (Some(id), len) = self.top_streak {
            debug_assert!(len == 0 || candidate_set.contains(&id));
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn check_invariants(&self, _films: &HashMap<FilmId, &Film>) {}
}

fn cmp_candidates(
    a: FilmId,
    b: FilmId,
    scores: &HashMap<FilmId, f32>,
    films: &HashMap<FilmId, &Film>,
) -> std::cmp::Ordering {
    let score_a = scores.get(&a).copied().unwrap_or(0.0);
    let score_b = scores.get(&b).copied().unwrap_or(0.0);
    let pop_a = films.get(&a).map(|f| f.popularity).unwrap_or(0.0);
    let pop_b = films.get(&b).map(|f| f.popularity).unwrap_or(0.0);
    score_b
        .partial_cmp(&score_a)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(pop_b.partial_cmp(&pop_a).unwrap_or(std::cmp::Ordering::Equal))
}

fn scoring_key_sequence(
    ids: &[FilmId],
    scores: &HashMap<FilmId, f32>,
    films: &HashMap<FilmId, &Film>,
) -> Vec<(i64, i64)> {
    ids.iter()
        .map(|id| {
            let score = scores.get(id).copied().unwrap_or(0.0);
            let pop = films.get(id).map(|f| f.popularity).unwrap_or(0.0);
            ((score * 1000.0) as i64, (pop * 1000.0) as i64)
        })
        .collect()
}
