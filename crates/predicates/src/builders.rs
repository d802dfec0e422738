//! Dynamic question builders: generate additional questions per turn from
//! the current candidate pool, on top of the static catalogue.

use std::collections::{HashMap, HashSet};

use catalogue::{Film, FilmDetails, FilmId};

use crate::predicate::Predicate;
use crate::question::{Question, Tag};
use crate::title::{bucket as title_bucket, normalize as normalize_title};

/// Per-film extended details, capped at 50 comparisons per §9's design note
/// ("builders that need per-film details cap their inner work at 50
/// comparisons").
pub struct DetailedFilm<'a> {
    pub film: &'a Film,
    pub details: &'a FilmDetails,
}

const DETAIL_CAP: usize = 50;

fn capped<'a>(pool: &'a [DetailedFilm<'a>]) -> &'a [DetailedFilm<'a>] {
    if pool.len() > DETAIL_CAP {
        &pool[..DETAIL_CAP]
    } else {
        pool
    }
}

/// Active when `10 <= pool.len() <= 500`. Targets the current top
/// candidate's own attributes so a single answer can confirm or eliminate it.
pub fn build_validation_questions(top: &DetailedFilm, rest: &[DetailedFilm]) -> Vec<Question> {
    let mut qs = Vec::with_capacity(20);

    if let Some(director) = top
        .details
        .crew
        .iter()
        .find(|c| c.job.eq_ignore_ascii_case("director"))
    {
        qs.push(Question::new(
            format!("validate_director_{}", director.person_id),
            format!("Was it directed by {}?", director.person_name),
            Tag::Validation,
            Predicate::Director(director.person_name.clone()),
        ));
    }

    for member in top.details.cast.iter().take(3) {
        qs.push(Question::new(
            format!("validate_actor_{}", member.person_id),
            format!("Does it star {}?", member.person_name),
            Tag::Validation,
            Predicate::Actor(member.person_name.clone()),
        ));
    }

    if let Some(year) = top.film.year {
        qs.push(Question::new(
            format!("validate_year_{year}"),
            format!("Was it released in exactly {year}?"),
            Tag::Validation,
            Predicate::YearEquals(year),
        ));
    }

    if let Some(collection) = &top.film.collection {
        qs.push(Question::new(
            format!("validate_collection_{}", collection.id),
            format!("Does it belong to the \"{}\" collection?", collection.name),
            Tag::Validation,
            Predicate::Franchise {
                label: collection.name.clone(),
                aliases: vec![],
            },
        ));
    }

    let sample = capped(rest);
    let mut keyword_pool_freq: HashMap<&str, usize> = HashMap::new();
    for df in sample {
        for kw in &df.details.keywords {
            *keyword_pool_freq.entry(kw.as_str()).or_default() += 1;
        }
    }

    let mut rare_keywords: Vec<&str> = top
        .details
        .keywords
        .iter()
        .map(String::as_str)
        .collect();
    rare_keywords.sort_by_key(|k| (keyword_pool_freq.get(k).copied().unwrap_or(0), *k));
    rare_keywords.truncate(5);

    for kw in rare_keywords {
        qs.push(Question::new(
            format!("validate_keyword_{}", slug(kw)),
            format!("Is \"{kw}\" a key theme or element?"),
            Tag::Validation,
            Predicate::Keyword {
                needle: kw.to_string(),
                fuzzy: kw.len() >= 4,
            },
        ));
    }

    qs.truncate(20);
    qs
}

/// Counts keywords across the pool, discards generic/short keywords, and
/// returns an adaptive top-k (larger on small pools).
pub fn build_keyword_questions(pool: &[DetailedFilm]) -> Vec<Question> {
    let sample = capped(pool);
    let pool_len = sample.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for df in sample {
        for kw in &df.details.keywords {
            if kw.len() >= 4 {
                *counts.entry(kw.as_str()).or_default() += 1;
            }
        }
    }

    let min_count = if pool_len >= 50 { 2 } else { 1 };
    let max_fraction = 0.85;
    let mut candidates: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|(_, c)| *c >= min_count)
        .filter(|(_, c)| pool_len == 0 || (*c as f32 / pool_len as f32) <= max_fraction)
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let top_k = if pool_len <= 20 {
        15
    } else if pool_len <= 100 {
        10
    } else {
        6
    };
    candidates.truncate(top_k);

    candidates
        .into_iter()
        .map(|(kw, _)| {
            Question::new(
                format!("keyword_dyn_{}", slug(kw)),
                format!("Does it involve \"{kw}\"?"),
                Tag::KeywordDyn,
                Predicate::Keyword {
                    needle: kw.to_string(),
                    fuzzy: true,
                },
            )
        })
        .collect()
}

/// Counts cast and directors across the pool; actors are filtered by a
/// language-origin allowlist derived from the pool's dominant language.
pub fn build_people_questions(pool: &[DetailedFilm], plain_pool: &[Film]) -> Vec<Question> {
    let allowlist = dominant_language_allowlist(plain_pool);
    let sample = capped(pool);

    let mut director_counts: HashMap<u32, (String, usize)> = HashMap::new();
    let mut actor_counts: HashMap<u32, (String, usize)> = HashMap::new();

    for df in sample {
        for crew in &df.details.crew {
            if crew.job.eq_ignore_ascii_case("director") {
                let entry = director_counts
                    .entry(crew.person_id)
                    .or_insert((crew.person_name.clone(), 0));
                entry.1 += 1;
            }
        }
        if allowlist.contains(&df.film.original_language) {
            for cast in &df.details.cast {
                let entry = actor_counts
                    .entry(cast.person_id)
                    .or_insert((cast.person_name.clone(), 0));
                entry.1 += 1;
            }
        }
    }

    let mut qs = Vec::new();
    let mut directors: Vec<_> = director_counts.into_iter().collect();
    directors.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then(a.0.cmp(&b.0)));
    for (id, (name, count)) in directors.into_iter().take(8) {
        if count >= 1 {
            qs.push(Question::new(
                format!("people_dyn_director_{id}"),
                format!("Was it directed by {name}?"),
                Tag::Director,
                Predicate::Director(name),
            ));
        }
    }

    let mut actors: Vec<_> = actor_counts.into_iter().collect();
    actors.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then(a.0.cmp(&b.0)));
    for (id, (name, count)) in actors.into_iter().take(10) {
        if count >= 1 {
            qs.push(Question::new(
                format!("people_dyn_actor_{id}"),
                format!("Does it star {name}?"),
                Tag::Actor,
                Predicate::Actor(name),
            ));
        }
    }

    qs
}

/// Derives the allowlist of original-language codes for actor questions:
/// languages reaching a 70% majority in the pool, falling back to an
/// English-speaking-by-decade heuristic when no language dominates.
fn dominant_language_allowlist(pool: &[Film]) -> HashSet<String> {
    if pool.is_empty() {
        return HashSet::new();
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for f in pool {
        if !f.original_language.is_empty() {
            *counts.entry(f.original_language.as_str()).or_default() += 1;
        }
    }
    let total = pool.len();
    if let Some((lang, count)) = counts.iter().max_by_key(|(_, c)| **c) {
        if *count as f32 / total as f32 >= 0.70 {
            return HashSet::from([lang.to_string()]);
        }
    }
    HashSet::from(["en".to_string()])
}

/// A single dichotomy pivot at the pool's median year, plus per-decade
/// questions where a decade is strictly between 0% and 100% of the pool.
pub fn build_year_questions(pool: &[Film]) -> Vec<Question> {
    let mut years: Vec<u16> = pool.iter().filter_map(|f| f.year).collect();
    if years.is_empty() {
        return Vec::new();
    }
    years.sort_unstable();

    let mut qs = Vec::new();
    let median = years[years.len() / 2];
    qs.push(Question::new(
        format!("year_dyn_median_{median}"),
        format!("Was it released in {median} or later?"),
        Tag::Year,
        Predicate::YearAfter(median),
    ));

    let total = pool.len();
    let mut decade_counts: HashMap<u16, usize> = HashMap::new();
    for y in &years {
        *decade_counts.entry((y / 10) * 10).or_default() += 1;
    }
    let mut decades: Vec<_> = decade_counts.into_iter().collect();
    decades.sort_by_key(|(decade, _)| *decade);
    for (decade, count) in decades {
        if count > 0 && count < total {
            qs.push(Question::new(
                format!("year_dyn_decade_{decade}"),
                format!("Was it released in the {decade}s?"),
                Tag::Year,
                Predicate::Decade(decade),
            ));
        }
    }

    qs
}

/// Active when `2 <= pool.len() <= 15`. Adds questions that strictly
/// partition the small pool: title-first-letter, title-word-count,
/// per-actor, per-director.
pub fn build_binary_questions(pool: &[DetailedFilm]) -> Vec<Question> {
    let n = pool.len();
    let mut qs = Vec::new();
    if !(2..=15).contains(&n) {
        return qs;
    }

    let mut bucket_counts: HashMap<&'static str, usize> = HashMap::new();
    for df in pool {
        let normalized = normalize_title(&df.film.title);
        *bucket_counts.entry(title_bucket(&normalized)).or_default() += 1;
    }
    for (bucket, count) in &bucket_counts {
        if *count > 0 && *count < n {
            qs.push(Question::new(
                format!("binary_title_bucket_{bucket}"),
                format!("Does the title start with a letter in {bucket}?"),
                Tag::Title,
                Predicate::TitleBucket(bucket),
            ));
        }
    }

    let mut word_count_buckets: HashMap<usize, usize> = HashMap::new();
    for df in pool {
        let words = df.film.title.split_whitespace().count();
        *word_count_buckets.entry(words).or_default() += 1;
    }
    for (words, count) in &word_count_buckets {
        if *count > 0 && *count < n {
            qs.push(word_count_question(*words));
        }
    }

    let mut actor_counts: HashMap<u32, (String, usize)> = HashMap::new();
    let mut director_counts: HashMap<u32, (String, usize)> = HashMap::new();
    for df in pool {
        for cast in &df.details.cast {
            actor_counts
                .entry(cast.person_id)
                .or_insert((cast.person_name.clone(), 0))
                .1 += 1;
        }
        for crew in &df.details.crew {
            if crew.job.eq_ignore_ascii_case("director") {
                director_counts
                    .entry(crew.person_id)
                    .or_insert((crew.person_name.clone(), 0))
                    .1 += 1;
            }
        }
    }
    for (id, (name, count)) in actor_counts {
        if count > 0 && count < n {
            qs.push(Question::new(
                format!("binary_actor_{id}"),
                format!("Does it star {name}?"),
                Tag::Actor,
                Predicate::Actor(name),
            ));
        }
    }
    for (id, (name, count)) in director_counts {
        if count > 0 && count < n {
            qs.push(Question::new(
                format!("binary_director_{id}"),
                format!("Was it directed by {name}?"),
                Tag::Director,
                Predicate::Director(name),
            ));
        }
    }

    qs
}

fn word_count_question(words: usize) -> Question {
    Question::new(
        format!("binary_title_words_{words}"),
        format!("Does the title have exactly {words} word(s)?"),
        Tag::Title,
        Predicate::WordCount(words),
    )
}

fn slug(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Convenience bundle for callers holding both the film and its fetched
/// details, keyed by id.
pub fn zip_details<'a>(films: &'a [Film], details: &'a HashMap<FilmId, FilmDetails>) -> Vec<DetailedFilm<'a>> {
    films
        .iter()
        .filter_map(|f| details.get(&f.id).map(|d| DetailedFilm { film: f, details: d }))
        .collect()
}
