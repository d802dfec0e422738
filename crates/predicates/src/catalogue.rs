//! The static question catalogue: generated combinatorially from the genre
//! map, decade/year pivots, runtime and finance thresholds, and regional
//! groupings, rather than hand-listed one entry at a time.

use catalogue::GenreMap;

use crate::predicate::{Cmp, FinanceField, Predicate, Region};
use crate::question::{Question, Tag};

/// Common original-language codes the static catalogue asks about directly.
const LANGUAGES: [(&str, &str); 8] = [
    ("en", "English"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("de", "German"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("hi", "Hindi"),
];

/// Hand-tuned franchise special cases, matched on title/collection/keyword
/// substrings in addition to the generic collection-name heuristic.
const FRANCHISES: [(&str, &[&str]); 6] = [
    ("Harry Potter", &["harry potter", "wizarding world"]),
    ("Star Wars", &["star wars", "skywalker"]),
    ("James Bond", &["james bond", "007"]),
    ("Marvel", &["avengers", "marvel cinematic"]),
    ("Fast & Furious", &["fast & furious", "fast and furious"]),
    ("The Lord of the Rings", &["lord of the rings", "the hobbit"]),
];

/// Build the static question set. `animation_genre_id`, when the catalogue's
/// genre map carries an "Animation" genre, wires up the `is_animation` /
/// `is_live_action` hard contradiction pair.
pub fn build_static_catalogue(genres: &GenreMap) -> Vec<Question> {
    let mut qs = Vec::new();
    let animation_id = genres.id_of("Animation");

    push_language_questions(&mut qs);
    push_genre_questions(&mut qs, genres, animation_id);
    push_decade_questions(&mut qs);
    push_year_pivot_questions(&mut qs);
    push_runtime_questions(&mut qs);
    push_country_questions(&mut qs);
    push_finance_questions(&mut qs);
    push_format_questions(&mut qs);
    push_franchise_questions(&mut qs);
    push_title_questions(&mut qs);

    qs
}

fn push_language_questions(qs: &mut Vec<Question>) {
    let sibling_keys: Vec<String> = LANGUAGES
        .iter()
        .map(|(code, _)| format!("language_{code}"))
        .collect();

    for (code, label) in LANGUAGES {
        let key = format!("language_{code}");
        let siblings = sibling_keys
            .iter()
            .filter(|k| *k != &key)
            .cloned()
            .collect::<Vec<_>>();
        qs.push(
            Question::new(
                key,
                format!("Is the original language {label}?"),
                Tag::Language,
                Predicate::Language(code.to_string()),
            )
            .excluding(siblings),
        );
    }
}

fn push_genre_questions(qs: &mut Vec<Question>, genres: &GenreMap, animation_id: Option<u32>) {
    for (id, name) in genres.iter() {
        qs.push(Question::new(
            format!("genre_{id}"),
            format!("Is it a {name} film?"),
            Tag::Genre,
            Predicate::Genre(id),
        ));
    }

    if let Some(id) = animation_id {
        qs.push(
            Question::new(
                "is_animation",
                "Is it animated?",
                Tag::GenreBinary,
                Predicate::IsAnimation(id),
            )
            .excluding(["is_live_action".to_string()]),
        );
        qs.push(
            Question::new(
                "is_live_action",
                "Is it live-action?",
                Tag::GenreBinary,
                Predicate::IsLiveAction(id),
            )
            .excluding(["is_animation".to_string()]),
        );
    }
}

fn push_decade_questions(qs: &mut Vec<Question>) {
    for decade_start in (1920..=2020).step_by(10) {
        qs.push(Question::new(
            format!("decade_{decade_start}"),
            format!("Was it released in the {decade_start}s?"),
            Tag::Decade,
            Predicate::Decade(decade_start),
        ));
    }
}

fn push_year_pivot_questions(qs: &mut Vec<Question>) {
    qs.push(
        Question::new(
            "after_1980",
            "Was it released in 1980 or later?",
            Tag::Year,
            Predicate::YearAfter(1980),
        )
        .excluding(["before_1970".to_string()]),
    );
    qs.push(
        Question::new(
            "before_1970",
            "Was it released before 1970?",
            Tag::Year,
            Predicate::YearBefore(1970),
        )
        .excluding(["after_1980".to_string()]),
    );
    qs.push(Question::new(
        "after_2010",
        "Was it released in 2010 or after?",
        Tag::Year,
        Predicate::YearAfter(2010),
    ));
    qs.push(Question::new(
        "before_2000",
        "Was it released before 2000?",
        Tag::Year,
        Predicate::YearBefore(2000),
    ));
}

fn push_runtime_questions(qs: &mut Vec<Question>) {
    qs.push(
        Question::new(
            "runtime_lt_90",
            "Is it shorter than 90 minutes?",
            Tag::Runtime,
            Predicate::Runtime(Cmp::Lt, 90),
        )
        .excluding(["runtime_ge_150".to_string()]),
    );
    qs.push(
        Question::new(
            "runtime_ge_150",
            "Is it 150 minutes or longer?",
            Tag::Runtime,
            Predicate::Runtime(Cmp::Ge, 150),
        )
        .excluding(["runtime_lt_90".to_string()]),
    );
    qs.push(Question::new(
        "runtime_ge_120",
        "Is it 2 hours or longer?",
        Tag::Runtime,
        Predicate::Runtime(Cmp::Ge, 120),
    ));
}

fn push_country_questions(qs: &mut Vec<Question>) {
    for region in [Region::American, Region::French, Region::European, Region::Asian] {
        qs.push(Question::new(
            format!("country_{}", region.label().to_lowercase()),
            format!("Was it produced in {}?", region.label()),
            Tag::Country,
            Predicate::Country(region),
        ));
    }
}

fn push_finance_questions(qs: &mut Vec<Question>) {
    qs.push(
        Question::new(
            "big_budget",
            "Did it have a big budget (over $100M)?",
            Tag::Budget,
            Predicate::Finance(FinanceField::Budget, Cmp::Ge, 100_000_000.0),
        )
        .excluding(["small_budget".to_string()]),
    );
    qs.push(
        Question::new(
            "small_budget",
            "Was it made on a small budget (under $10M)?",
            Tag::Budget,
            Predicate::Finance(FinanceField::Budget, Cmp::Lt, 10_000_000.0),
        )
        .excluding(["big_budget".to_string()]),
    );
    qs.push(Question::new(
        "blockbuster_revenue",
        "Did it earn over $500M at the box office?",
        Tag::Finance,
        Predicate::Finance(FinanceField::Revenue, Cmp::Ge, 500_000_000.0),
    ));
    qs.push(Question::new(
        "highly_popular",
        "Is it widely popular right now?",
        Tag::Finance,
        Predicate::Finance(FinanceField::Popularity, Cmp::Ge, 50.0),
    ));
    qs.push(Question::new(
        "critically_acclaimed",
        "Is it critically acclaimed (rating 8 or higher)?",
        Tag::Finance,
        Predicate::Finance(FinanceField::VoteAverage, Cmp::Ge, 8.0),
    ));
}

fn push_format_questions(qs: &mut Vec<Question>) {
    qs.push(
        Question::new(
            "is_saga",
            "Is it part of a film series?",
            Tag::Saga,
            Predicate::IsSaga,
        )
        .excluding(["is_standalone".to_string()]),
    );
    qs.push(
        Question::new(
            "is_standalone",
            "Is it a standalone film (not part of a series)?",
            Tag::Saga,
            Predicate::IsStandalone,
        )
        .excluding(["is_saga".to_string()]),
    );
    qs.push(Question::new(
        "is_short_film",
        "Is it a short film (under 40 minutes)?",
        Tag::Format,
        Predicate::IsShortFilm,
    ));
    qs.push(Question::new(
        "is_feature_length",
        "Is it a feature-length film?",
        Tag::Format,
        Predicate::IsFeatureLength,
    ));
    qs.push(Question::new(
        "is_adult",
        "Is it an adult film?",
        Tag::Format,
        Predicate::Keyword {
            needle: "adult".to_string(),
            fuzzy: true,
        },
    ));
}

fn push_franchise_questions(qs: &mut Vec<Question>) {
    for (label, aliases) in FRANCHISES {
        qs.push(Question::new(
            format!("franchise_{}", label.to_lowercase().replace([' ', '&'], "_")),
            format!("Is it part of the {label} franchise?"),
            Tag::Franchise,
            Predicate::Franchise {
                label: label.to_string(),
                aliases: aliases.iter().map(|s| s.to_string()).collect(),
            },
        ));
    }
}

fn push_title_questions(qs: &mut Vec<Question>) {
    for bucket in ["A-D", "E-H", "I-L", "M-P", "Q-T", "U-Z", "0-9"] {
        qs.push(Question::new(
            format!("title_bucket_{bucket}"),
            format!("Does the title start with a letter in {bucket}?"),
            Tag::Title,
            Predicate::TitleBucket(bucket),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_hundreds_of_questions_with_a_typical_genre_map() {
        let genres = GenreMap::from_pairs((1..=19).map(|id| (id, format!("Genre{id}"))));
        let qs = build_static_catalogue(&genres);
        assert!(qs.len() > 50, "expected a sizeable static catalogue, got {}", qs.len());

        let keys: std::collections::HashSet<_> = qs.iter().map(|q| q.key.as_str()).collect();
        assert_eq!(keys.len(), qs.len(), "question keys must be unique");
    }

    #[test]
    fn contradiction_pairs_exclude_each_other() {
        let genres = GenreMap::default();
        let qs = build_static_catalogue(&genres);
        let big = qs.iter().find(|q| q.key == "big_budget").unwrap();
        assert!(big.excludes.contains("small_budget"));
    }

    #[test]
    fn only_budget_questions_are_hard() {
        let genres = GenreMap::default();
        let qs = build_static_catalogue(&genres);
        let budget_keys = ["big_budget", "small_budget"];
        let soft_keys = ["blockbuster_revenue", "highly_popular", "critically_acclaimed"];

        for key in budget_keys {
            let q = qs.iter().find(|q| q.key == key).unwrap();
            assert!(q.tag.is_hard(), "{key} should be a hard eliminator");
        }
        for key in soft_keys {
            let q = qs.iter().find(|q| q.key == key).unwrap();
            assert!(!q.tag.is_hard(), "{key} should be soft, not a hard eliminator");
        }
    }
}
