//! `Game`: the turn-driven facade combining State & Scoring, the Selector,
//! the Applicator, and the Convergence Controller into the four operations
//! §6 describes (`undo` lives one layer up, in the session crate).

use std::collections::HashMap;
use std::rc::Rc;

use catalogue::{CatalogueStore, FilmDetails, FilmId};
use predicates::{builders, Question};
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info};

use crate::answer::Answer;
use crate::applicator::apply_answer;
use crate::catalogue_data::CatalogueData;
use crate::config::EngineConfig;
use crate::convergence::{escape_hatch_forces_question, should_guess};
use crate::error::{EngineError, Result};
use crate::selector::select_question;
use crate::state::{EngineState, Phase, TerminalOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Question { key: String, prompt: String },
    Guess { film_id: FilmId, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub action: Action,
    pub question_number: u32,
    pub total_films: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalTurn {
    pub outcome: TerminalOutcome,
    pub questions_asked: u32,
    pub film_id: Option<FilmId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Turn(Turn),
    Terminal(TerminalTurn),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Found { questions_asked: u32, film_id: FilmId },
    Continue(StepOutcome),
}

/// One game in progress. Single-threaded and strictly turn-driven: every
/// public method runs to completion before returning, per §5.
pub struct Game {
    catalogue: Rc<CatalogueData>,
    store: Rc<CatalogueStore>,
    config: EngineConfig,
    pub state: EngineState,
    rng: ThreadRng,
}

impl Game {
    pub fn new(catalogue: Rc<CatalogueData>, store: Rc<CatalogueStore>, config: EngineConfig) -> Self {
        let state = EngineState::init(&catalogue.films);
        Self {
            catalogue,
            store,
            config,
            state,
            rng: rand::thread_rng(),
        }
    }

    /// Begins the game: returns the first question (or an immediate
    /// terminal outcome for a one- or zero-film catalogue).
    pub fn start(&mut self) -> Result<StepOutcome> {
        info!(total_films = self.catalogue.films.len(), "starting game");
        let mut outcome = self.next_step()?;
        if let StepOutcome::Turn(ref mut turn) = outcome {
            turn.total_films = Some(self.catalogue.films.len());
        }
        Ok(outcome)
    }

    /// Applies an answer to the pending question and advances to the next
    /// turn.
    pub fn answer(&mut self, answer: Answer) -> Result<StepOutcome> {
        if self.state.phase != Phase::Asking {
            return Err(EngineError::NoQuestionPending);
        }
        let question = self
            .state
            .pending_question
            .take()
            .ok_or(EngineError::NoQuestionPending)?;

        let films_by_id = self.catalogue.films_by_id_refs();
        let details_by_id = self.details_for(&self.state.candidates);
        let details_refs: HashMap<FilmId, &FilmDetails> =
            details_by_id.iter().map(|(id, d)| (*id, d)).collect();

        debug!(key = %question.key, ?answer, "applying answer");
        apply_answer(
            &mut self.state,
            &question,
            answer,
            &films_by_id,
            &details_refs,
            &self.config,
        );
        self.state.check_invariants(&films_by_id);

        if self.state.escape_hatch_pending {
            self.state.consecutive_guesses = 0;
            self.state.escape_hatch_pending = false;
        }

        self.next_step()
    }

    /// Confirms or rejects the pending guess.
    pub fn confirm(&mut self, correct: bool) -> Result<ConfirmOutcome> {
        if self.state.phase != Phase::Guessing {
            return Err(EngineError::NoGuessPending);
        }
        let film_id = self
            .state
            .pending_guess
            .take()
            .ok_or(EngineError::NoGuessPending)?;

        if correct {
            self.state.phase = Phase::Terminal(TerminalOutcome::Success);
            info!(film_id, questions_asked = self.state.question_count, "guess confirmed");
            return Ok(ConfirmOutcome::Found {
                questions_asked: self.state.question_count,
                film_id,
            });
        }

        info!(film_id, "guess rejected, applying cooldown");
        self.state.purge(film_id);
        self.state.guess_cooldown = self.config.guess_cooldown;
        self.state.top_streak = (None, 0);
        self.state.consecutive_guesses += 1;
        self.state.phase = Phase::Asking;

        let outcome = self.next_step()?;
        Ok(ConfirmOutcome::Continue(outcome))
    }

    /// Looks up a film's title from the loaded catalogue, for callers
    /// displaying a terminal outcome's `film_id`.
    pub fn catalogue_title(&self, film_id: FilmId) -> Option<String> {
        self.catalogue.films_by_id.get(&film_id).map(|f| f.title.clone())
    }

    /// Reconstructs the `StepOutcome` a caller should see for the state as
    /// it stands right now, without advancing anything. Used by the session
    /// layer after `undo` restores a snapshot.
    pub fn current(&self) -> StepOutcome {
        match &self.state.phase {
            Phase::Terminal(outcome) => StepOutcome::Terminal(TerminalTurn {
                outcome: *outcome,
                questions_asked: self.state.question_count,
                film_id: self.state.candidates.first().copied(),
            }),
            Phase::Guessing => {
                let film_id = self.state.pending_guess.unwrap_or_default();
                let title = self
                    .catalogue
                    .films_by_id
                    .get(&film_id)
                    .map(|f| f.title.clone())
                    .unwrap_or_default();
                StepOutcome::Turn(Turn {
                    action: Action::Guess { film_id, title },
                    question_number: self.state.question_count,
                    total_films: None,
                })
            }
            Phase::Asking => match &self.state.pending_question {
                Some(q) => StepOutcome::Turn(Turn {
                    action: Action::Question {
                        key: q.key.clone(),
                        prompt: q.prompt.clone(),
                    },
                    question_number: self.state.question_count + 1,
                    total_films: None,
                }),
                None => StepOutcome::Terminal(TerminalTurn {
                    outcome: TerminalOutcome::Failure,
                    questions_asked: self.state.question_count,
                    film_id: None,
                }),
            },
        }
    }

    fn next_step(&mut self) -> Result<StepOutcome> {
        if self.state.candidates.is_empty() {
            self.state.phase = Phase::Terminal(TerminalOutcome::Failure);
            return Ok(StepOutcome::Terminal(TerminalTurn {
                outcome: TerminalOutcome::Failure,
                questions_asked: self.state.question_count,
                film_id: None,
            }));
        }
        if self.state.candidates.len() == 1 {
            let film_id = self.state.candidates[0];
            self.state.phase = Phase::Terminal(TerminalOutcome::Success);
            return Ok(StepOutcome::Terminal(TerminalTurn {
                outcome: TerminalOutcome::Success,
                questions_asked: self.state.question_count,
                film_id: Some(film_id),
            }));
        }

        let escape = escape_hatch_forces_question(&self.state, &self.config);
        if !escape && should_guess(&self.state, &self.config) {
            let film_id = self.state.top().expect("non-empty candidates");
            let title = self
                .catalogue
                .films_by_id
                .get(&film_id)
                .map(|f| f.title.clone())
                .unwrap_or_default();
            self.state.phase = Phase::Guessing;
            self.state.pending_guess = Some(film_id);
            info!(film_id, %title, "proposing guess");
            return Ok(StepOutcome::Turn(Turn {
                action: Action::Guess { film_id, title },
                question_number: self.state.question_count,
                total_films: None,
            }));
        }

        self.state.escape_hatch_pending = escape;

        let turn_questions = self.build_turn_questions();
        let films_by_id = self.catalogue.films_by_id_refs();
        let details_by_id = self.details_for(&self.state.candidates);
        let details_refs: HashMap<FilmId, &FilmDetails> =
            details_by_id.iter().map(|(id, d)| (*id, d)).collect();

        let is_first_turn = self.state.question_count == 0;
        let chosen = select_question(
            &turn_questions,
            &self.state,
            &films_by_id,
            &details_refs,
            is_first_turn,
            &mut self.rng,
        )
        .cloned();

        match chosen {
            Some(q) => {
                debug!(key = %q.key, "selected question");
                self.state.pending_question = Some(q.clone());
                self.state.phase = Phase::Asking;
                Ok(StepOutcome::Turn(Turn {
                    action: Action::Question {
                        key: q.key.clone(),
                        prompt: q.prompt.clone(),
                    },
                    question_number: self.state.question_count + 1,
                    total_films: None,
                }))
            }
            None => Err(EngineError::NoEligibleQuestion {
                remaining: self.state.candidates.clone(),
            }),
        }
    }

    /// Builds the union of the static catalogue and the five dynamic
    /// builders for the current pool, per §4.3.
    fn build_turn_questions(&self) -> Vec<Question> {
        let pool_len = self.state.candidates.len();
        let pool_films: Vec<catalogue::Film> = self
            .state
            .candidates
            .iter()
            .filter_map(|id| self.catalogue.films_by_id.get(id).cloned())
            .collect();

        let mut dynamic: Vec<Question> = Vec::new();
        dynamic.extend(builders::build_year_questions(&pool_films));

        let sample_ids: Vec<FilmId> = self.state.candidates.iter().take(50).copied().collect();
        let details_by_id = self.details_for(&sample_ids);
        let sample_films: Vec<catalogue::Film> = sample_ids
            .iter()
            .filter_map(|id| self.catalogue.films_by_id.get(id).cloned())
            .collect();
        let detailed: Vec<builders::DetailedFilm> = sample_films
            .iter()
            .filter_map(|f| details_by_id.get(&f.id).map(|d| builders::DetailedFilm { film: f, details: d }))
            .collect();

        if (10..=500).contains(&pool_len) {
            if let Some(top_id) = self.state.top() {
                if let (Some(top_film), Some(top_details)) =
                    (self.catalogue.films_by_id.get(&top_id), details_by_id.get(&top_id))
                {
                    let top_detailed = builders::DetailedFilm {
                        film: top_film,
                        details: top_details,
                    };
                    let rest: Vec<builders::DetailedFilm> = detailed
                        .iter()
                        .filter(|d| d.film.id != top_id)
                        .map(|d| builders::DetailedFilm {
                            film: d.film,
                            details: d.details,
                        })
                        .collect();
                    dynamic.extend(builders::build_validation_questions(&top_detailed, &rest));
                }
            }
        }

        dynamic.extend(builders::build_keyword_questions(&detailed));
        dynamic.extend(builders::build_people_questions(&detailed, &pool_films));

        if (2..=15).contains(&pool_len) {
            let full_ids: Vec<FilmId> = self.state.candidates.clone();
            let full_details = self.details_for(&full_ids);
            let full_films: Vec<catalogue::Film> = full_ids
                .iter()
                .filter_map(|id| self.catalogue.films_by_id.get(id).cloned())
                .collect();
            let full_detailed: Vec<builders::DetailedFilm> = full_films
                .iter()
                .filter_map(|f| full_details.get(&f.id).map(|d| builders::DetailedFilm { film: f, details: d }))
                .collect();
            dynamic.extend(builders::build_binary_questions(&full_detailed));
        }

        let mut all = self.catalogue.static_questions.clone();
        all.extend(dynamic);
        all
    }

    fn details_for(&self, ids: &[FilmId]) -> HashMap<FilmId, FilmDetails> {
        let mut out = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Ok(details) = self.store.details(*id) {
                out.insert(*id, details);
            }
        }
        out
    }
}

/// A trivial convenience for callers that want a seeded RNG for
/// reproducible tests; production code uses `rand::thread_rng()` via
/// `Game::new`.
pub fn seeded_rng(seed: u64) -> impl Rng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(seed)
}
