use crate::charset::{format_token, has_upper_case, unglue_digits, WORD_PARTS_SPLITTER, WORD_SPLITTER};

/// A word of a query or of a suggestion value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The word as it was written.
    pub text: String,
    /// Lowercased, `ё` folded to `е`.
    pub normalized: String,
    /// The word as written had upper-case letters: a proper noun, even if it is a stopword.
    pub has_upper_case: bool,
}

impl Token {
    fn new(text: &str) -> Self {
        Token {
            text: text.to_string(),
            normalized: format_token(text),
            has_upper_case: has_upper_case(text),
        }
    }

    /// Parts of a compound word, if the word is compound.
    fn sub_tokens(&self) -> Vec<Token> {
        let texts: Vec<&str> = WORD_PARTS_SPLITTER.split(&self.text).collect();
        if texts.len() < 2 {
            return Vec::new();
        }
        let normalized: Vec<&str> = WORD_PARTS_SPLITTER.split(&self.normalized).collect();

        texts
            .iter()
            .zip(normalized.iter())
            .filter(|(_, norm)| !norm.is_empty())
            .map(|(text, norm)| Token {
                text: text.to_string(),
                normalized: norm.to_string(),
                has_upper_case: has_upper_case(text),
            })
            .collect()
    }
}

fn contains<S: AsRef<str>>(list: &[S], word: &str) -> bool {
    list.iter().any(|item| item.as_ref() == word)
}

fn raw_words(text: &str) -> Vec<&str> {
    WORD_SPLITTER.split(text).filter(|w| !w.is_empty()).collect()
}

/// Splits text into words.
///
/// Words missing from `deprioritized` come first, so that stopwords only get
/// used when nothing else matches. Compound words are followed by their parts.
pub fn tokenize<S: AsRef<str>>(text: &str, deprioritized: &[S]) -> Vec<Token> {
    let text = unglue_digits(text);
    let words: Vec<Token> = raw_words(&text).into_iter().map(Token::new).collect();

    let (preferred, other): (Vec<Token>, Vec<Token>) = words
        .into_iter()
        .partition(|token| !contains(deprioritized, &token.normalized));

    let mut result = Vec::new();
    for token in preferred.into_iter().chain(other) {
        let parts = token.sub_tokens();
        result.push(token);
        result.extend(parts);
    }
    result
}

/// Normalized words of `text` with `tokenize` ordering, as plain strings.
pub fn tokenize_words<S: AsRef<str>>(text: &str, deprioritized: &[S]) -> Vec<String> {
    tokenize(text, deprioritized)
        .into_iter()
        .map(|token| token.normalized)
        .collect()
}

/// Normalizes a string, splits it into words and drops stopwords.
///
/// The last word always survives, so a query consisting of a single stopword
/// still yields something to match.
pub fn split<S: AsRef<str>>(text: &str, stopwords: &[S]) -> Vec<String> {
    let clean = unglue_digits(&format_token(text));
    let mut words: Vec<String> = raw_words(&clean).into_iter().map(String::from).collect();

    let last = match words.pop() {
        Some(word) => word,
        None => return Vec::new(),
    };

    words.retain(|word| !contains(stopwords, word));
    words.push(last);
    words
}

/// Replaces every word with its compound parts.
pub fn split_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .flat_map(|token| {
            WORD_PARTS_SPLITTER
                .split(token.as_ref())
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_tokenize_basic() {
        let words = tokenize_words("Москва Тверская", NONE);
        assert_eq!(words, vec!["москва", "тверская"]);
    }

    #[test]
    fn test_tokenize_keeps_original_text() {
        let tokens = tokenize("ЁЛКИ палки", NONE);
        assert_eq!(tokens[0].text, "ЁЛКИ");
        assert_eq!(tokens[0].normalized, "елки");
        assert!(tokens[0].has_upper_case);
        assert!(!tokens[1].has_upper_case);
    }

    #[test]
    fn test_tokenize_is_repeatable() {
        let text = "г Санкт-Петербург, ул Ленина 50лет";
        assert_eq!(tokenize(text, &["г", "ул"]), tokenize(text, &["г", "ул"]));
    }

    #[test]
    fn test_tokenize_moves_stopwords_to_the_end() {
        let words = tokenize_words("г москва ул тверская", &["г", "ул"]);
        assert_eq!(words, vec!["москва", "тверская", "г", "ул"]);
    }

    #[test]
    fn test_tokenize_only_stopwords() {
        let words = tokenize_words("ул г", &["г", "ул"]);
        assert_eq!(words, vec!["ул", "г"]);
    }

    #[test]
    fn test_tokenize_compound_words() {
        let words = tokenize_words("Ростов-на-Дону", NONE);
        assert_eq!(words, vec!["ростов-на-дону", "ростов", "на", "дону"]);
    }

    #[test]
    fn test_tokenize_bare_delimiter_word() {
        let words = tokenize_words("дом - 5", NONE);
        assert_eq!(words, vec!["дом", "-", "5"]);
    }

    #[test]
    fn test_tokenize_unglues_digits() {
        let words = tokenize_words("50лет", NONE);
        assert_eq!(words, vec!["50", "лет"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("", NONE).is_empty());
        assert!(tokenize(" ,. ", NONE).is_empty());
    }

    #[test]
    fn test_split_drops_stopwords() {
        assert_eq!(split("г Москва ул Тверская", &["г", "ул"]), vec!["москва", "тверская"]);
    }

    #[test]
    fn test_split_keeps_last_word() {
        assert_eq!(split("в", &["в"]), vec!["в"]);
        assert_eq!(split("Москва г", &["г"]), vec!["москва", "г"]);
    }

    #[test]
    fn test_split_folds_every_yo() {
        assert_eq!(split("Ёжкино ёлкино", NONE), vec!["ежкино", "елкино"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split("", NONE).is_empty());
        assert!(split("  ", &["г"]).is_empty());
    }

    #[test]
    fn test_split_tokens() {
        let words = vec!["санкт-петербург".to_string(), "невский".to_string()];
        assert_eq!(split_tokens(&words), vec!["санкт", "петербург", "невский"]);
    }
}
