//! Title normalisation for the title-letter joker category.
//!
//! Strips leading articles, strips accents, keeps alphanumerics only, and
//! upper-cases the result, so "The Île" and "ile" land on the same bucket.

const ARTICLES: [&str; 3] = ["the ", "a ", "an "];

pub fn normalize(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = ARTICLES
        .iter()
        .find_map(|a| lower.strip_prefix(a))
        .unwrap_or(&lower);

    stripped
        .chars()
        .map(strip_accent)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Maps common accented Latin letters to their plain ASCII form. Films in
/// the catalogue draw from a handful of European languages, so a full
/// Unicode decomposition table is more machinery than this needs.
fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Which title-letter bucket a normalised title falls into.
pub fn bucket(normalized: &str) -> &'static str {
    match normalized.chars().next() {
        Some(c) if ('A'..='D').contains(&c) => "A-D",
        Some(c) if ('E'..='H').contains(&c) => "E-H",
        Some(c) if ('I'..='L').contains(&c) => "I-L",
        Some(c) if ('M'..='P').contains(&c) => "M-P",
        Some(c) if ('Q'..='T').contains(&c) => "Q-T",
        Some(c) if ('U'..='Z').contains(&c) => "U-Z",
        Some(c) if c.is_ascii_digit() => "0-9",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_article_and_accents() {
        assert_eq!(normalize("The Amélie"), "AMELIE");
        assert_eq!(normalize("A Clockwork Orange"), "CLOCKWORKORANGE");
    }

    #[test]
    fn buckets_by_first_letter() {
        assert_eq!(bucket(&normalize("Zodiac")), "U-Z");
        assert_eq!(bucket(&normalize("The 13th Warrior")), "0-9");
    }
}
