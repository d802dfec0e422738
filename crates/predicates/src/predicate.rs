//! The predicate taxonomy: a total function from a film to `{Yes, No, Unknown}`.
//!
//! Modelled as a plain enum rather than `Box<dyn Fn>` so it stays
//! serialisable, exhaustively matchable in tests, and cheap to generate in
//! bulk for the static catalogue (`crate::catalogue`).

use std::collections::HashSet;

use catalogue::{Film, FilmDetails};

use crate::tri::Tri;

/// Comparison direction for runtime/finance threshold predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Lt,
    Ge,
}

/// A regional grouping of production-country codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    American,
    French,
    European,
    Asian,
}

impl Region {
    pub fn codes(self) -> &'static [&'static str] {
        match self {
            Region::American => &["US", "CA"],
            Region::French => &["FR"],
            Region::European => &[
                "FR", "DE", "IT", "ES", "GB", "NL", "BE", "SE", "DK", "NO", "FI", "PL", "AT",
                "CH", "IE", "PT",
            ],
            Region::Asian => &["JP", "KR", "CN", "HK", "IN", "TH", "TW"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Region::American => "American",
            Region::French => "French",
            Region::European => "European",
            Region::Asian => "Asian",
        }
    }
}

/// A financial or popularity attribute compared against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinanceField {
    Budget,
    Revenue,
    Popularity,
    VoteAverage,
    VoteCount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Original language equals an ISO code. Hard eliminator.
    Language(String),
    /// Film carries the given genre id. Soft.
    Genre(u32),
    /// Animation-vs-live-action split, a hard genre-binary predicate.
    IsAnimation(u32),
    IsLiveAction(u32),
    /// Directed by a named person. Hard eliminator.
    Director(String),
    /// Named actor appears in the cast. Soft, allowlist-gated by the caller.
    Actor(String),
    /// Collection/title/keyword substring match, with hand-tuned aliases
    /// for well-known franchises. Hard eliminator.
    Franchise {
        label: String,
        aliases: Vec<String>,
    },
    /// Keyword or cast-character substring match. Hard eliminator.
    Character(String),
    /// Release year in `[pivot, pivot + 10)`. Hard eliminator.
    Decade(u16),
    /// Release year compared against a pivot. Hard eliminator.
    YearBefore(u16),
    YearAfter(u16),
    YearEquals(u16),
    /// Runtime compared against a threshold in minutes. Hard eliminator.
    Runtime(Cmp, u32),
    /// Production countries intersect a regional set. Hard eliminator.
    Country(Region),
    /// Keyword set contains a substring. `fuzzy` allows substring match for
    /// strings of length >= 4; short strings require an exact match. Soft.
    Keyword { needle: String, fuzzy: bool },
    /// Finance/popularity threshold. Soft.
    Finance(FinanceField, Cmp, f64),
    /// Belongs to a collection at all ("saga" vs "standalone"). Hard.
    IsSaga,
    IsStandalone,
    /// Runtime-based feature/short classification. Mixed (format/meta).
    IsFeatureLength,
    IsShortFilm,
    /// Title, normalised, starts with a letter in the given bucket. Soft,
    /// capped to one per game by the selector's eligibility filter.
    TitleBucket(&'static str),
    /// Title has exactly this many whitespace-separated words. Soft.
    WordCount(usize),
}

impl Predicate {
    /// Evaluate against a film. `details` is `None` when the caller chose
    /// not to (or could not) fetch extended attributes; predicates needing
    /// them degrade to `Unknown` rather than panicking.
    pub fn evaluate(&self, film: &Film, details: Option<&FilmDetails>) -> Tri {
        match self {
            Predicate::Language(code) => {
                if film.original_language.is_empty() {
                    Tri::Unknown
                } else if film.original_language.eq_ignore_ascii_case(code) {
                    Tri::Yes
                } else {
                    Tri::No
                }
            }
            Predicate::Genre(id) => genre_tri(film, *id),
            Predicate::IsAnimation(animation_id) => genre_tri(film, *animation_id),
            Predicate::IsLiveAction(animation_id) => match genre_tri(film, *animation_id) {
                Tri::Yes => Tri::No,
                Tri::No => Tri::Yes,
                Tri::Unknown => Tri::Unknown,
            },
            Predicate::Director(name) => match details {
                None => Tri::Unknown,
                Some(d) if d.crew.is_empty() => Tri::Unknown,
                Some(d) => tri_bool(d.crew.iter().any(|c| {
                    c.department.eq_ignore_ascii_case("directing")
                        && c.job.eq_ignore_ascii_case("director")
                        && c.person_name.eq_ignore_ascii_case(name)
                })),
            },
            Predicate::Actor(name) => match details {
                None => Tri::Unknown,
                Some(d) if d.cast.is_empty() => Tri::Unknown,
                Some(d) => {
                    tri_bool(d.cast.iter().any(|c| c.person_name.eq_ignore_ascii_case(name)))
                }
            },
            Predicate::Franchise { label, aliases } => {
                let title_hit = title_contains_any(&film.title, aliases)
                    || film.title.to_lowercase().contains(&label.to_lowercase());
                let collection_hit = film
                    .collection
                    .as_ref()
                    .map(|c| {
                        c.name.to_lowercase().contains(&label.to_lowercase())
                            || title_contains_any(&c.name, aliases)
                    })
                    .unwrap_or(false);
                let keyword_hit = details
                    .map(|d| keyword_contains_any(&d.keywords, aliases))
                    .unwrap_or(false);
                if title_hit || collection_hit || keyword_hit {
                    Tri::Yes
                } else if details.is_none() && film.collection.is_none() {
                    Tri::Unknown
                } else {
                    Tri::No
                }
            }
            Predicate::Character(needle) => {
                let keyword_hit = details
                    .map(|d| d.keywords.iter().any(|k| contains_ci(k, needle)))
                    .unwrap_or(false);
                let cast_hit = details
                    .map(|d| d.cast.iter().any(|c| contains_ci(&c.character, needle)))
                    .unwrap_or(false);
                match details {
                    None => Tri::Unknown,
                    Some(d) if d.keywords.is_empty() && d.cast.is_empty() => Tri::Unknown,
                    _ => tri_bool(keyword_hit || cast_hit),
                }
            }
            Predicate::Decade(pivot) => match film.year {
                None => Tri::Unknown,
                Some(y) => tri_bool(y >= *pivot && y < pivot + 10),
            },
            Predicate::YearBefore(pivot) => match film.year {
                None => Tri::Unknown,
                Some(y) => tri_bool(y < *pivot),
            },
            Predicate::YearAfter(pivot) => match film.year {
                None => Tri::Unknown,
                Some(y) => tri_bool(y >= *pivot),
            },
            Predicate::YearEquals(year) => match film.year {
                None => Tri::Unknown,
                Some(y) => tri_bool(y == *year),
            },
            Predicate::Runtime(cmp, minutes) => match film.runtime {
                None => Tri::Unknown,
                Some(r) => tri_bool(match cmp {
                    Cmp::Lt => r < *minutes,
                    Cmp::Ge => r >= *minutes,
                }),
            },
            Predicate::Country(region) => match details {
                None => Tri::Unknown,
                Some(d) if d.countries.is_empty() => Tri::Unknown,
                Some(d) => {
                    tri_bool(d.countries.iter().any(|c| region.codes().contains(&c.as_str())))
                }
            },
            Predicate::Keyword { needle, fuzzy } => match details {
                None => Tri::Unknown,
                Some(d) if d.keywords.is_empty() => Tri::Unknown,
                Some(d) => tri_bool(d.keywords.iter().any(|k| {
                    if *fuzzy && needle.len() >= 4 {
                        contains_ci(k, needle)
                    } else {
                        k.eq_ignore_ascii_case(needle)
                    }
                })),
            },
            Predicate::Finance(field, cmp, threshold) => {
                let value = match field {
                    FinanceField::Budget => match film.budget {
                        None => return Tri::Unknown,
                        Some(b) => b as f64,
                    },
                    FinanceField::Revenue => match film.revenue {
                        None => return Tri::Unknown,
                        Some(r) => r as f64,
                    },
                    FinanceField::Popularity => film.popularity as f64,
                    FinanceField::VoteAverage => film.vote_average as f64,
                    FinanceField::VoteCount => film.vote_count as f64,
                };
                tri_bool(match cmp {
                    Cmp::Lt => value < *threshold,
                    Cmp::Ge => value >= *threshold,
                })
            }
            Predicate::IsSaga => tri_bool(film.collection.is_some()),
            Predicate::IsStandalone => tri_bool(film.collection.is_none()),
            Predicate::IsFeatureLength => match film.runtime {
                None => Tri::Unknown,
                Some(r) => tri_bool(r >= 40),
            },
            Predicate::IsShortFilm => match film.runtime {
                None => Tri::Unknown,
                Some(r) => tri_bool(r < 40),
            },
            Predicate::TitleBucket(bucket) => {
                let normalized = crate::title::normalize(&film.title);
                tri_bool(crate::title::bucket(&normalized) == *bucket)
            }
            Predicate::WordCount(words) => {
                tri_bool(film.title.split_whitespace().count() == *words)
            }
        }
    }
}

fn genre_tri(film: &Film, genre_id: u32) -> Tri {
    if film.genre_ids.is_empty() {
        Tri::Unknown
    } else {
        tri_bool(film.genre_ids.contains(&genre_id))
    }
}

fn tri_bool(b: bool) -> Tri {
    if b {
        Tri::Yes
    } else {
        Tri::No
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn title_contains_any(title: &str, aliases: &[String]) -> bool {
    aliases.iter().any(|a| contains_ci(title, a))
}

fn keyword_contains_any(keywords: &HashSet<String>, aliases: &[String]) -> bool {
    aliases
        .iter()
        .any(|a| keywords.iter().any(|k| contains_ci(k, a)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue::{CastMember, Collection, CrewMember};
    use std::collections::HashSet;

    fn film() -> Film {
        Film {
            id: 1,
            title: "The Matrix".to_string(),
            year: Some(1999),
            popularity: 90.0,
            vote_average: 8.2,
            vote_count: 20000,
            runtime: Some(136),
            budget: Some(63_000_000),
            revenue: Some(463_000_000),
            original_language: "en".to_string(),
            genre_ids: HashSet::from([28]),
            collection: Some(Collection {
                id: 1,
                name: "The Matrix Collection".to_string(),
            }),
        }
    }

    fn details() -> FilmDetails {
        FilmDetails {
            keywords: HashSet::from(["dystopia".to_string(), "hacker".to_string()]),
            cast: vec![CastMember {
                person_id: 1,
                person_name: "Keanu Reeves".to_string(),
                character: "Neo".to_string(),
                order: 0,
            }],
            crew: vec![CrewMember {
                person_id: 2,
                person_name: "Lana Wachowski".to_string(),
                job: "Director".to_string(),
                department: "Directing".to_string(),
            }],
            countries: HashSet::from(["US".to_string()]),
        }
    }

    #[test]
    fn language_hard_eliminator() {
        let f = film();
        assert_eq!(Predicate::Language("en".into()).evaluate(&f, None), Tri::Yes);
        assert_eq!(Predicate::Language("fr".into()).evaluate(&f, None), Tri::No);
    }

    #[test]
    fn genre_unknown_when_no_genres_loaded() {
        let mut f = film();
        f.genre_ids.clear();
        assert_eq!(Predicate::Genre(28).evaluate(&f, None), Tri::Unknown);
    }

    #[test]
    fn director_needs_details() {
        let f = film();
        assert_eq!(
            Predicate::Director("Lana Wachowski".into()).evaluate(&f, None),
            Tri::Unknown
        );
        assert_eq!(
            Predicate::Director("Lana Wachowski".into()).evaluate(&f, Some(&details())),
            Tri::Yes
        );
        assert_eq!(
            Predicate::Director("Someone Else".into()).evaluate(&f, Some(&details())),
            Tri::No
        );
    }

    #[test]
    fn franchise_checks_title_collection_and_keywords() {
        let f = film();
        let p = Predicate::Franchise {
            label: "matrix".into(),
            aliases: vec![],
        };
        assert_eq!(p.evaluate(&f, None), Tri::Yes);
    }

    #[test]
    fn decade_and_runtime() {
        let f = film();
        assert_eq!(Predicate::Decade(1990).evaluate(&f, None), Tri::Yes);
        assert_eq!(Predicate::Decade(2000).evaluate(&f, None), Tri::No);
        assert_eq!(Predicate::Runtime(Cmp::Ge, 150).evaluate(&f, None), Tri::No);
        assert_eq!(Predicate::Runtime(Cmp::Lt, 150).evaluate(&f, None), Tri::Yes);
    }

    #[test]
    fn keyword_fuzzy_vs_exact() {
        let f = film();
        let d = details();
        assert_eq!(
            Predicate::Keyword {
                needle: "hack".into(),
                fuzzy: true
            }
            .evaluate(&f, Some(&d)),
            Tri::Yes
        );
        assert_eq!(
            Predicate::Keyword {
                needle: "hack".into(),
                fuzzy: false
            }
            .evaluate(&f, Some(&d)),
            Tri::No
        );
    }

    #[test]
    fn title_bucket_uses_normalised_title() {
        let f = film();
        assert_eq!(Predicate::TitleBucket("M-P").evaluate(&f, None), Tri::Yes);
        assert_eq!(Predicate::TitleBucket("A-D").evaluate(&f, None), Tri::No);
    }
}
