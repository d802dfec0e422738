//! The Question Selector: entropy-based scoring under logical constraints.

use std::collections::HashMap;

use catalogue::{Film, FilmId};
use predicates::{Question, Tag, Tri};
use rand::Rng;

use crate::state::EngineState;

const SAMPLE_CAP: usize = 500;

fn shannon(p: f32) -> f32 {
    if p <= 0.0 {
        0.0
    } else {
        -p * p.log2()
    }
}

/// Counts of `(yes, no, unknown)` from evaluating a predicate across a pool.
struct Split {
    yes: usize,
    no: usize,
    unknown: usize,
}

fn split_for(question: &Question, films: &[&Film], details: &HashMap<FilmId, &catalogue::FilmDetails>) -> Split {
    let mut split = Split { yes: 0, no: 0, unknown: 0 };
    for film in films {
        let d = details.get(&film.id).copied();
        match question.predicate.evaluate(film, d) {
            Tri::Yes => split.yes += 1,
            Tri::No => split.no += 1,
            Tri::Unknown => split.unknown += 1,
        }
    }
    split
}

/// Whether `q` is eligible given `asked` and the one-title-joker-per-game
/// rule.
fn is_eligible(q: &Question, asked: &std::collections::HashSet<String>, joker_used: bool) -> bool {
    if asked.contains(&q.key) {
        return false;
    }
    if !q.requires.is_subset(asked) {
        return false;
    }
    if q.excludes.intersection(asked).next().is_some() {
        return false;
    }
    if q.is_title_joker() && joker_used {
        return false;
    }
    true
}

/// Scores one question against the sampled pool, per §4.4's rule. Returns
/// `None` if the question is rejected outright (degenerate split).
fn score_question(
    q: &Question,
    split: &Split,
    pool_len: usize,
    recent_types: &std::collections::VecDeque<Tag>,
) -> Option<f32> {
    let n = split.yes + split.no;
    if (split.yes == 0 || split.no == 0) && split.unknown == 0 {
        return None;
    }
    if n == 0 {
        return None;
    }

    let p_yes = split.yes as f32 / n as f32;
    let p_no = split.no as f32 / n as f32;
    let h = shannon(p_yes) + shannon(p_no);
    let mut score = h - 0.5 * (split.unknown as f32 / pool_len.max(1) as f32);

    let strictly_splits = split.yes > 0 && split.no > 0;
    let multiplier = match q.tag {
        Tag::Language => 120.0,
        Tag::Validation => {
            if pool_len <= 20 {
                80.0
            } else if pool_len <= 50 {
                60.0
            } else {
                40.0
            }
        }
        Tag::Director => 2.0,
        Tag::Franchise => 1.8,
        Tag::Character => 1.5,
        Tag::Actor if strictly_splits => 1.4,
        Tag::KeywordDyn if pool_len <= 30 => 1.3,
        Tag::Country => 1.25,
        Tag::Title if pool_len <= 10 => 1.2,
        _ => 1.0,
    };
    score *= multiplier;

    if !matches!(q.tag, Tag::Language | Tag::Validation) {
        let last_two_same = recent_types.len() >= 2
            && recent_types.iter().rev().take(2).all(|t| *t == q.tag);
        let recent_five: Vec<Tag> = recent_types.iter().rev().take(5).copied().collect();
        let distinct: std::collections::HashSet<Tag> = recent_five.iter().copied().collect();
        let tag_count_in_five = recent_five.iter().filter(|t| **t == q.tag).count();
        let thin_diversity = distinct.len() < 3 && tag_count_in_five >= 2;
        if last_two_same || thin_diversity {
            score *= 0.1;
        }
    }

    Some(score)
}

/// Chooses the next question, or `None` if the selector is exhausted.
///
/// `films` is the full candidate pool in `EngineState.candidates` order,
/// already sampled to at most 500 by the caller if larger. `is_first_turn`
/// triggers the top-3 random selection on turn one.
pub fn select_question<'q>(
    catalogue_questions: &'q [Question],
    state: &EngineState,
    films_by_id: &HashMap<FilmId, &Film>,
    details_by_id: &HashMap<FilmId, &catalogue::FilmDetails>,
    is_first_turn: bool,
    rng: &mut impl Rng,
) -> Option<&'q Question> {
    let pool_len = state.candidates.len();
    let sampled: Vec<&Film> = state
        .candidates
        .iter()
        .take(SAMPLE_CAP)
        .filter_map(|id| films_by_id.get(id).copied())
        .collect();

    let joker_used = state.asked.iter().any(|k| k.starts_with("title_") || k.starts_with("binary_title_bucket_"));

    let mut scored: Vec<(usize, f32)> = Vec::new();
    for (idx, q) in catalogue_questions.iter().enumerate() {
        if !is_eligible(q, &state.asked, joker_used) {
            continue;
        }
        let split = split_for(q, &sampled, details_by_id);
        if let Some(score) = score_question(q, &split, pool_len, &state.recent_types) {
            if score > 0.0 {
                scored.push((idx, score));
            }
        }
    }

    if scored.is_empty() {
        return None;
    }

    if is_first_turn {
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let top_n = scored.len().min(3);
        let pick = rng.gen_range(0..top_n);
        return Some(&catalogue_questions[scored[pick].0]);
    }

    let best = scored
        .iter()
        .enumerate()
        .max_by(|a, b| {
            a.1 .1
                .partial_cmp(&b.1 .1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.cmp(&a.0))
        })
        .map(|(_, (idx, _))| *idx)?;

    Some(&catalogue_questions[best])
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::Predicate;
    use std::collections::{HashSet, VecDeque};

    fn film(id: FilmId, popularity: f32, lang: &str) -> Film {
        Film {
            id,
            title: format!("Film {id}"),
            year: Some(2000),
            popularity,
            vote_average: 7.0,
            vote_count: 100,
            runtime: Some(100),
            budget: None,
            revenue: None,
            original_language: lang.to_string(),
            genre_ids: HashSet::new(),
            collection: None,
        }
    }

    #[test]
    fn rejects_degenerate_split() {
        let films = [film(1, 1.0, "en"), film(2, 1.0, "en")];
        let refs: Vec<&Film> = films.iter().collect();
        let q = Question::new("lang_en", "English?", Tag::Language, Predicate::Language("en".into()));
        let split = split_for(&q, &refs, &HashMap::new());
        let recent = VecDeque::new();
        assert!(score_question(&q, &split, 2, &recent).is_none());
    }

    #[test]
    fn diversity_penalty_applies_after_two_same_tag() {
        let q = Question::new("genre_1", "Action?", Tag::Genre, Predicate::Genre(1));
        let split = Split { yes: 5, no: 5, unknown: 0 };
        let mut recent = VecDeque::new();
        recent.push_back(Tag::Genre);
        recent.push_back(Tag::Genre);
        let penalized = score_question(&q, &split, 10, &recent).unwrap();
        let baseline = score_question(&q, &split, 10, &VecDeque::new()).unwrap();
        assert!(penalized < baseline);
    }
}
