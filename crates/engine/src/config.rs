//! Engine configuration, with every value §6 enumerates exposed and
//! defaulted.

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Strikes a soft-category contradiction accumulates before the film is
    /// eliminated.
    pub max_strikes: u8,
    /// Consecutive questions the same film must lead for before the streak
    /// rule alone triggers a guess.
    pub top_streak_questions: u32,
    /// Turns the convergence rule is suppressed after a rejected guess.
    pub guess_cooldown: u32,
    /// Rejected guesses allowed before the escape hatch forces a targeted
    /// question.
    pub max_consecutive_guesses: u32,
    /// Optional cap on how many films `discover_films` loads.
    pub catalogue_row_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_strikes: 3,
            top_streak_questions: 10,
            guess_cooldown: 2,
            max_consecutive_guesses: 4,
            catalogue_row_limit: None,
        }
    }
}
