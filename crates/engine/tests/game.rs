//! Integration tests driving `Game` end to end against a small in-memory
//! catalogue, covering the boundary cases and convergence properties.

use std::rc::Rc;

use catalogue::{CatalogueStore, FilmDetails};
use engine::{Action, CatalogueData, ConfirmOutcome, EngineConfig, Game, StepOutcome};
use predicates::Tri;
use rusqlite::Connection;

fn seeded_store(films: &[(i64, &str, &str, f64, &str)]) -> CatalogueStore {
    let conn = Connection::open_in_memory().unwrap();
    catalogue::schema::ensure_schema(&conn).unwrap();
    for (id, title, release_date, popularity, lang) in films {
        conn.execute(
            "INSERT INTO movies (id, title, release_date, popularity, vote_average,
                vote_count, runtime, budget, revenue, original_language,
                collection_id, collection_name, countries_json)
             VALUES (?1, ?2, ?3, ?4, 7.0, 100, 100, NULL, NULL, ?5, NULL, NULL, '[\"US\"]')",
            rusqlite::params![id, title, release_date, popularity, lang],
        )
        .unwrap();
    }
    CatalogueStore::from_connection(conn).unwrap()
}

fn game_for(store: CatalogueStore) -> (Game, Rc<CatalogueStore>) {
    let store = Rc::new(store);
    let config = EngineConfig::default();
    let data = Rc::new(CatalogueData::load(&store, &config).unwrap());
    (Game::new(data, store.clone(), config), store)
}

#[test]
fn empty_catalogue_ends_in_failure_with_no_questions() {
    let store = seeded_store(&[]);
    let (mut game, _store) = game_for(store);
    match game.start().unwrap() {
        StepOutcome::Terminal(t) => {
            assert_eq!(t.questions_asked, 0);
            assert!(t.film_id.is_none());
        }
        other => panic!("expected immediate terminal failure, got {other:?}"),
    }
}

#[test]
fn single_film_catalogue_is_an_immediate_win() {
    let store = seeded_store(&[(1, "Only One", "2001-01-01", 50.0, "en")]);
    let (mut game, _store) = game_for(store);
    match game.start().unwrap() {
        StepOutcome::Terminal(t) => {
            assert_eq!(t.film_id, Some(1));
        }
        other => panic!("expected immediate terminal success, got {other:?}"),
    }
}

/// Drives a full game to completion by always answering every question
/// truthfully with respect to `target`, and asserts the properties §8
/// requires hold at every step along the way.
#[test]
fn truthful_play_converges_on_the_target_film() {
    let store = seeded_store(&[
        (1, "Alpha", "2012-05-01", 80.0, "en"),
        (2, "Beta", "1995-06-01", 10.0, "fr"),
        (3, "Gamma", "2020-09-09", 60.0, "en"),
        (4, "Delta", "1988-03-03", 20.0, "de"),
        (5, "Epsilon", "2015-07-07", 40.0, "en"),
    ]);
    let target: catalogue::FilmId = 3;

    let store = Rc::new(store);
    let config = EngineConfig::default();
    let data = Rc::new(CatalogueData::load(&store, &config).unwrap());
    let target_film = data.films_by_id.get(&target).unwrap().clone();
    let target_details: FilmDetails = store.details(target).unwrap();

    let mut game = Game::new(data, store.clone(), config);
    let mut outcome = game.start().unwrap();

    let mut asked_counts = Vec::new();
    let mut guard = 0;
    loop {
        guard += 1;
        assert!(guard < 200, "game did not converge within a reasonable number of turns");

        match outcome {
            StepOutcome::Turn(turn) => match turn.action {
                Action::Question { ref key, .. } => {
                    let question = game
                        .state
                        .pending_question
                        .clone()
                        .expect("pending question must be set while Asking");
                    assert_eq!(&question.key, key);
                    let truth = question.predicate.evaluate(&target_film, Some(&target_details));
                    let answer = match truth {
                        Tri::Yes => engine::Answer::Yes,
                        Tri::No => engine::Answer::No,
                        Tri::Unknown => engine::Answer::Unknown,
                    };
                    let before = game.state.candidates.len();
                    asked_counts.push(before);
                    outcome = game.answer(answer).unwrap();
                    let after = game.state.candidates.len();
                    assert!(after <= before, "candidate pool must never grow");
                    assert!(
                        game.state.candidates.contains(&target) || matches!(game.state.phase, engine::Phase::Terminal(_)),
                        "truthful answers must never eliminate the real target"
                    );
                }
                Action::Guess { film_id, .. } => {
                    let correct = film_id == target;
                    match game.confirm(correct).unwrap() {
                        ConfirmOutcome::Found { film_id, .. } => {
                            assert_eq!(film_id, target);
                            return;
                        }
                        ConfirmOutcome::Continue(next) => outcome = next,
                    }
                }
            },
            StepOutcome::Terminal(t) => {
                assert_eq!(t.film_id, Some(target));
                return;
            }
        }
    }
}

#[test]
fn rejected_guess_forces_a_cooldown_before_guessing_again() {
    let store = seeded_store(&[
        (1, "Alpha", "2012-05-01", 80.0, "en"),
        (2, "Beta", "1995-06-01", 10.0, "fr"),
    ]);
    let (mut game, _store) = game_for(store);
    let _ = game.start().unwrap();

    // Force the score gap that the domination rule looks for.
    game.state.question_count = 10;
    if let Some(top) = game.state.top() {
        game.state.scores.insert(top, 100.0);
    }

    // Manually trigger a guess/reject cycle through the public API repeatedly
    // and confirm the cooldown is non-zero right after a rejection.
    let outcome = game.answer(engine::Answer::Unknown);
    if let Ok(StepOutcome::Turn(turn)) = outcome {
        if let Action::Guess { film_id, .. } = turn.action {
            let result = game.confirm(film_id != 1).unwrap();
            match result {
                ConfirmOutcome::Continue(_) => {
                    assert!(game.state.guess_cooldown > 0 || game.state.consecutive_guesses > 0);
                }
                ConfirmOutcome::Found { .. } => {}
            }
        }
    }
}
