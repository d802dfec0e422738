//! The Answer Applicator: applies one answer to the state.

use std::collections::HashMap;

use catalogue::{Film, FilmId};
use predicates::{Question, Tag, Tri};

use crate::answer::Answer;
use crate::config::EngineConfig;
use crate::state::EngineState;

fn boosts(tag: Tag) -> (f32, f32) {
    match tag {
        Tag::Validation => (8.0, 4.0),
        Tag::Director => (7.0, 4.0),
        Tag::Franchise | Tag::Character => (6.0, 4.0),
        Tag::Actor => (5.0, 3.0),
        Tag::Language | Tag::Decade | Tag::Year => (5.0, 3.0),
        Tag::Genre => (3.0, 3.0),
        _ => (5.0, 3.0),
    }
}

/// Applies `answer` to `question`, mutating `state` in place. `films` gives
/// popularity for re-sorting; `details` supplies extended attributes for
/// predicates that need them (missing entries evaluate to `Unknown`).
pub fn apply_answer(
    state: &mut EngineState,
    question: &Question,
    answer: Answer,
    films_by_id: &HashMap<FilmId, &Film>,
    details_by_id: &HashMap<FilmId, &catalogue::FilmDetails>,
    config: &EngineConfig,
) {
    let hard = question.tag.is_hard();
    let (yes_boost, no_boost) = boosts(question.tag);

    let candidate_ids = state.candidates.clone();
    let mut to_purge: Vec<FilmId> = Vec::new();

    for id in &candidate_ids {
        let film = match films_by_id.get(id) {
            Some(f) => *f,
            None => continue,
        };
        let details = details_by_id.get(id).copied();
        let result = question.predicate.evaluate(film, details);

        match answer {
            Answer::Yes => match result {
                Tri::Yes => bump(state, *id, yes_boost),
                Tri::Unknown => bump(state, *id, if hard { -2.0 } else { -0.5 }),
                Tri::No => to_purge.push(*id),
            },
            Answer::No => match result {
                Tri::No => bump(state, *id, no_boost),
                Tri::Unknown => bump(state, *id, if hard { -1.0 } else { 0.3 }),
                Tri::Yes => to_purge.push(*id),
            },
            Answer::ProbablyYes => match result {
                Tri::Yes => bump(state, *id, if hard { 2.0 } else { 1.0 }),
                Tri::No => {
                    bump(state, *id, if hard { -2.5 } else { -1.0 });
                    if hard {
                        strike(state, *id);
                    }
                }
                Tri::Unknown => {}
            },
            Answer::ProbablyNo => match result {
                Tri::No => bump(state, *id, if hard { 2.0 } else { 1.0 }),
                Tri::Yes => {
                    bump(state, *id, if hard { -2.5 } else { -1.0 });
                    if hard {
                        strike(state, *id);
                    }
                }
                Tri::Unknown => {}
            },
            Answer::Unknown => {
                if result == Tri::Unknown {
                    bump(state, *id, 0.2);
                }
            }
        }
    }

    for id in to_purge {
        state.purge(id);
    }

    if !matches!(answer, Answer::Yes | Answer::No) {
        let over_strikes: Vec<FilmId> = state
            .strikes
            .iter()
            .filter(|(_, &count)| count >= config.max_strikes)
            .map(|(id, _)| *id)
            .collect();
        for id in over_strikes {
            state.purge(id);
        }
    }

    state.asked.insert(question.key.clone());
    if matches!(answer, Answer::Yes) && question.is_language() {
        for sibling in &question.excludes {
            state.asked.insert(sibling.clone());
        }
    }

    state.resort(films_by_id);
    state.update_streak();
    state.record_recent_type(question.tag);
    state.question_count += 1;
    state.guess_cooldown = state.guess_cooldown.saturating_sub(1);
}

fn bump(state: &mut EngineState, id: FilmId, delta: f32) {
    if let Some(score) = state.scores.get_mut(&id) {
        *score += delta;
    }
}

fn strike(state: &mut EngineState, id: FilmId) {
    if let Some(count) = state.strikes.get_mut(&id) {
        *count = count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::Predicate;
    use std::collections::HashSet;

    fn film(id: FilmId, year: u16) -> Film {
        Film {
            id,
            title: format!("Film {id}"),
            year: Some(year),
            popularity: id as f32,
            vote_average: 7.0,
            vote_count: 10,
            runtime: Some(100),
            budget: None,
            revenue: None,
            original_language: "en".to_string(),
            genre_ids: HashSet::new(),
            collection: None,
        }
    }

    #[test]
    fn yes_answer_purges_no_films_and_boosts_yes_films() {
        let films = vec![film(1, 2012), film(2, 1995), film(3, 2020)];
        let films_by_id: HashMap<FilmId, &Film> = films.iter().map(|f| (f.id, f)).collect();
        let mut state = EngineState::init(&films);

        let q = Question::new(
            "after_2010",
            "Released in 2010 or after?",
            Tag::Year,
            Predicate::YearAfter(2010),
        );
        apply_answer(&mut state, &q, Answer::Yes, &films_by_id, &HashMap::new(), &EngineConfig::default());

        let ids: HashSet<FilmId> = state.candidates.iter().copied().collect();
        assert_eq!(ids, HashSet::from([1, 3]));
        assert!(!state.scores.contains_key(&2));
        assert!(!state.strikes.contains_key(&2));
        assert!(state.asked.contains("after_2010"));
        assert_eq!(state.question_count, 1);
    }

    #[test]
    fn unknown_answer_never_eliminates() {
        let films = vec![film(1, 2012), film(2, 1995)];
        let films_by_id: HashMap<FilmId, &Film> = films.iter().map(|f| (f.id, f)).collect();
        let mut state = EngineState::init(&films);
        let before = state.candidates.len();

        let q = Question::new(
            "after_2010",
            "Released in 2010 or after?",
            Tag::Year,
            Predicate::YearAfter(2010),
        );
        apply_answer(&mut state, &q, Answer::Unknown, &films_by_id, &HashMap::new(), &EngineConfig::default());
        assert_eq!(state.candidates.len(), before);
    }

    #[test]
    fn language_yes_marks_sibling_languages_asked() {
        let films = vec![film(1, 2012)];
        let films_by_id: HashMap<FilmId, &Film> = films.iter().map(|f| (f.id, f)).collect();
        let mut state = EngineState::init(&films);

        let mut q = Question::new(
            "language_en",
            "English?",
            Tag::Language,
            Predicate::Language("en".into()),
        );
        q.excludes.insert("language_fr".to_string());
        q.excludes.insert("language_de".to_string());

        apply_answer(&mut state, &q, Answer::Yes, &films_by_id, &HashMap::new(), &EngineConfig::default());
        assert!(state.asked.contains("language_fr"));
        assert!(state.asked.contains("language_de"));
    }
}
