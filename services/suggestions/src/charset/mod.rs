//! Character classes shared by the tokenizer and the highlighter.

use regex::Regex;

/// Characters that separate words.
pub const WORD_DELIMITERS: &str = r#"\s"'~\*\.,:\|\[\]\(\)\{\}<>№"#;

/// Characters that separate parts of a compound word ("санкт-петербург").
pub const WORD_PARTS_DELIMITERS: &str = r"\-\+\\\?!@#$%^&";

lazy_static::lazy_static! {
    pub static ref WORD_SPLITTER: Regex = Regex::new(&format!("[{}]+", WORD_DELIMITERS)).unwrap();
    pub static ref WORD_PARTS_SPLITTER: Regex = Regex::new(&format!("[{}]+", WORD_PARTS_DELIMITERS)).unwrap();
    static ref DIGITS_THEN_LETTERS: Regex = Regex::new(r"(?i)(\d+)([а-яё]{2,})").unwrap();
    static ref LETTERS_THEN_DIGITS: Regex = Regex::new(r"(?i)([а-яё]+)(\d+)").unwrap();
}

/// Lowercases a token and folds `ё` into `е`.
pub fn format_token(token: &str) -> String {
    token.to_lowercase().replace('ё', "е")
}

/// Puts a space between digits and letters written together: "50лет" → "50 лет".
pub fn unglue_digits(text: &str) -> String {
    let text = DIGITS_THEN_LETTERS.replace_all(text, "${1} ${2}");
    LETTERS_THEN_DIGITS.replace_all(&text, "${1} ${2}").into_owned()
}

/// `true` when lowercasing changes the word, i.e. it has upper-case letters.
pub fn has_upper_case(word: &str) -> bool {
    word.to_lowercase() != word
}

/// Splits `text` into its first `n` characters and the rest.
pub(crate) fn split_at_char(text: &str, n: usize) -> (&str, &str) {
    match text.char_indices().nth(n) {
        Some((idx, _)) => text.split_at(idx),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token() {
        assert_eq!(format_token("Ёлкино"), "елкино");
        assert_eq!(format_token("ПОДЪЁМ"), "подъем");
    }

    #[test]
    fn test_unglue_digits() {
        assert_eq!(unglue_digits("50лет"), "50 лет");
        assert_eq!(unglue_digits("дом12"), "дом 12");
        // a single trailing letter is a house letter, not a word
        assert_eq!(unglue_digits("12а"), "12а");
    }

    #[test]
    fn test_word_splitter() {
        let words: Vec<&str> = WORD_SPLITTER
            .split("г. Москва, ул. «Тверская» (центр)")
            .filter(|w| !w.is_empty())
            .collect();
        assert_eq!(words, vec!["г", "Москва", "ул", "«Тверская»", "центр"]);
    }

    #[test]
    fn test_parts_splitter() {
        let parts: Vec<&str> = WORD_PARTS_SPLITTER.split("ростов-на-дону").collect();
        assert_eq!(parts, vec!["ростов", "на", "дону"]);
    }

    #[test]
    fn test_split_at_char() {
        assert_eq!(split_at_char("Москва", 3), ("Мос", "ква"));
        assert_eq!(split_at_char("abc", 10), ("abc", ""));
    }
}
