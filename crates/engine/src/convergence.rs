//! The Convergence Controller: decides when to stop asking and guess.

use crate::config::EngineConfig;
use crate::state::EngineState;

/// Whether the core should propose a guess right now, per §4.6's rule.
/// Suppressed entirely while `guess_cooldown > 0` (one question is forced
/// after a rejected guess).
pub fn should_guess(state: &EngineState, config: &EngineConfig) -> bool {
    if state.guess_cooldown > 0 {
        return false;
    }
    if state.candidates.len() == 1 {
        return true;
    }

    let score1 = state.top().map(|id| state.score_of(id));
    let score2 = state.second().map(|id| state.score_of(id));

    if state.question_count >= 5 {
        if let (Some(s1), Some(s2)) = (score1, score2) {
            if s2 > 0.0 && s1 >= 2.0 * s2 {
                return true;
            }
            if s2 <= 0.0 && s1 >= 10.0 {
                return true;
            }
        }
    }

    if state.top_streak.1 >= config.top_streak_questions {
        return true;
    }

    if state.candidates.len() <= 5 && state.question_count >= 7 {
        if let Some(s1) = score1 {
            if s1 >= 15.0 {
                return true;
            }
        }
    }

    false
}

/// Applies the escape hatch: once `consecutive_guesses` reaches the
/// configured max, the next turn must be a forced question regardless of
/// `should_guess`, and the counter resets after that one question.
pub fn escape_hatch_forces_question(state: &EngineState, config: &EngineConfig) -> bool {
    state.consecutive_guesses >= config.max_consecutive_guesses
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn state_with(scores: &[(u32, f32)], question_count: u32) -> EngineState {
        let films: Vec<catalogue::Film> = scores
            .iter()
            .map(|(id, _)| catalogue::Film {
                id: *id,
                title: format!("F{id}"),
                year: Some(2000),
                popularity: 1.0,
                vote_average: 7.0,
                vote_count: 10,
                runtime: Some(100),
                budget: None,
                revenue: None,
                original_language: "en".into(),
                genre_ids: Default::default(),
                collection: None,
            })
            .collect();
        let mut state = EngineState::init(&films);
        for (id, score) in scores {
            state.scores.insert(*id, *score);
        }
        let films_by_id: HashMap<u32, &catalogue::Film> = films.iter().map(|f| (f.id, f)).collect();
        state.resort(&films_by_id);
        state.question_count = question_count;
        state
    }

    #[test]
    fn single_candidate_always_guesses() {
        let state = state_with(&[(1, 0.0)], 0);
        assert!(should_guess(&state, &EngineConfig::default()));
    }

    #[test]
    fn domination_rule_fires_after_five_questions() {
        let state = state_with(&[(1, 26.0), (2, 4.0)], 6);
        assert!(should_guess(&state, &EngineConfig::default()));
    }

    #[test]
    fn cooldown_suppresses_the_rule() {
        let mut state = state_with(&[(1, 26.0), (2, 4.0)], 6);
        state.guess_cooldown = 2;
        assert!(!should_guess(&state, &EngineConfig::default()));
    }

    #[test]
    fn streak_rule_fires_without_score_domination() {
        let mut state = state_with(&[(1, 1.0), (2, 0.9)], 3);
        state.top_streak = (state.top(), 10);
        assert!(should_guess(&state, &EngineConfig::default()));
    }
}
