//! Pairs a predicate with a prompt, a routing key, and logical dependencies.

use std::collections::HashSet;

use crate::predicate::Predicate;

/// The category a question belongs to. Drives both scoring multipliers
/// (`Selector`) and hard/soft elimination (`Applicator`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Language,
    Validation,
    Director,
    Actor,
    Genre,
    GenreBinary,
    Franchise,
    Character,
    Decade,
    Year,
    Runtime,
    Country,
    KeywordDyn,
    Keyword,
    Finance,
    Budget,
    Saga,
    Format,
    Title,
}

impl Tag {
    /// Hard categories eliminate non-matching candidates immediately on a
    /// definite answer; soft categories only adjust scores and strikes.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            Tag::Language
                | Tag::Validation
                | Tag::Director
                | Tag::Franchise
                | Tag::Character
                | Tag::Decade
                | Tag::Year
                | Tag::Runtime
                | Tag::Country
                | Tag::Saga
                | Tag::Budget
                | Tag::GenreBinary
        )
    }
}

/// Immutable record: a routing key, a display prompt, a predicate, and
/// optional logical dependencies on other routing keys.
#[derive(Debug, Clone)]
pub struct Question {
    pub key: String,
    pub prompt: String,
    pub tag: Tag,
    pub predicate: Predicate,
    pub requires: HashSet<String>,
    pub excludes: HashSet<String>,
}

impl Question {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>, tag: Tag, predicate: Predicate) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            tag,
            predicate,
            requires: HashSet::new(),
            excludes: HashSet::new(),
        }
    }

    pub fn requiring(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.requires.extend(keys);
        self
    }

    pub fn excluding(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.excludes.extend(keys);
        self
    }

    pub fn is_title_joker(&self) -> bool {
        self.tag == Tag::Title
    }

    pub fn is_language(&self) -> bool {
        self.tag == Tag::Language
    }
}
