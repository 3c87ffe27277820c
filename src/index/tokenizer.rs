//! Word tokenizer
//!
//! Splits raw text into normalized word tokens. A token is a maximal run of
//! alphanumeric characters, hyphens and underscores, lower-cased. Stop words
//! (common English function words and single letters) are dropped.

/// Words that never enter the lexicon
const STOP_WORDS: &[&str] = &[
    "", "the", "of", "at", "on", "in", "is", "it", "and", "or", "a", "b", "c", "d", "e", "f",
    "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x",
    "y", "z",
];

/// Returns true if `word` is filtered out of the lexicon
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Normalizes a single query term the same way page text is tokenized
///
/// Returns `None` when nothing of the term survives (empty, punctuation only,
/// or a stop word). A term containing separators yields its first token.
pub fn normalize_word(word: &str) -> Option<String> {
    tokenize(word).next()
}

/// Tokenizes raw text into normalized words, in order of appearance
///
/// # Example
///
/// ```
/// use trawl::index::tokenize;
///
/// let words: Vec<String> = tokenize("The Quick-Brown_Fox, the FOX!").collect();
/// assert_eq!(words, vec!["quick-brown_fox", "fox"]);
/// ```
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .map(|piece| piece.trim().to_lowercase())
        .filter(|word| !is_stop_word(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text).collect()
    }

    #[test]
    fn test_tokenize_splits_and_folds_case() {
        assert_eq!(
            words("The Quick-Brown_Fox, the FOX!"),
            vec!["quick-brown_fox", "fox"]
        );
    }

    #[test]
    fn test_tokenize_drops_single_letters() {
        assert_eq!(words("a b c rust x"), vec!["rust"]);
    }

    #[test]
    fn test_tokenize_keeps_digits() {
        assert_eq!(words("Rust 2021 edition"), vec!["rust", "2021", "edition"]);
    }

    #[test]
    fn test_tokenize_whitespace_only() {
        assert!(words("  \n\t ").is_empty());
        assert!(words("").is_empty());
    }

    #[test]
    fn test_tokenize_unicode() {
        assert_eq!(words("Café naïve"), vec!["café", "naïve"]);
    }

    #[test]
    fn test_tokenize_keeps_duplicates() {
        assert_eq!(words("crab crab"), vec!["crab", "crab"]);
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  Rust "), Some("rust".to_string()));
        assert_eq!(normalize_word("FOX!"), Some("fox".to_string()));
        assert_eq!(normalize_word("the"), None);
        assert_eq!(normalize_word("!!"), None);
    }

    #[test]
    fn test_stop_words() {
        assert!(is_stop_word("and"));
        assert!(is_stop_word("q"));
        assert!(!is_stop_word("rust"));
    }
}
