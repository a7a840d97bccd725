use regex::Regex;

use crate::charset::WORD_PARTS_DELIMITERS;
use crate::tokenizer::Token;

/// Parts of a word matched by one query token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    /// Everything up to and including the last part delimiter before the token.
    pub before: &'a str,
    pub before_text: &'a str,
    pub before_delimiter: &'a str,
    pub text: &'a str,
    /// The rest of the word part the token starts, with trailing delimiters.
    pub after: &'a str,
}

/// Pattern for one query token.
///
/// The token may start the word or any of its parts ("петер" in
/// "санкт-петербург"), and absorbs the remainder of that part.
pub fn token_pattern(token: &str) -> Option<Regex> {
    let delimiters = WORD_PARTS_DELIMITERS;
    Regex::new(&format!(
        "(?i)^((.*)([{delimiters}]+))?({})([^{delimiters}]*[{delimiters}]*)",
        regex::escape(token)
    ))
    .ok()
}

/// Patterns for the query tokens, in token order.
pub fn token_patterns(tokens: &[Token]) -> Vec<Regex> {
    tokens
        .iter()
        .filter(|token| !token.normalized.is_empty())
        .filter_map(|token| token_pattern(&token.normalized))
        .collect()
}

/// Matches the first pattern that fits a normalized word.
pub fn find_token_match<'a>(patterns: &[Regex], normalized: &'a str) -> Option<TokenMatch<'a>> {
    patterns.iter().find_map(|pattern| {
        let caps = pattern.captures(normalized)?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        Some(TokenMatch {
            before: group(1),
            before_text: group(2),
            before_delimiter: group(3),
            text: group(4),
            after: group(5),
        })
    })
}
