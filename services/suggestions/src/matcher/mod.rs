//! Matchers pick the one suggestion a query unambiguously refers to.
//!
//! Every matcher answers `Some(index)` only when exactly one candidate fits;
//! no match and several matches both give `None`.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::common::{array_minus, get_text};
use crate::r#type::Suggestion;
use crate::tokenizer::{split, split_tokens};

type FieldFn = dyn Fn(&Suggestion) -> Option<String> + Send + Sync;

/// Reads one text field of a suggestion for [`Matcher::Fields`].
#[derive(Clone)]
pub struct FieldAccessor {
    name: String,
    get: Arc<FieldFn>,
    stopwords: Vec<String>,
}

impl FieldAccessor {
    pub fn new<F>(name: &str, get: F) -> Self
    where
        F: Fn(&Suggestion) -> Option<String> + Send + Sync + 'static,
    {
        FieldAccessor {
            name: name.to_string(),
            get: Arc::new(get),
            stopwords: Vec::new(),
        }
    }

    /// The suggestion's display value.
    pub fn value() -> Self {
        Self::new("value", |suggestion| Some(suggestion.value.clone()))
    }

    /// A dotted path into the suggestion data, e.g. `"address.value"`.
    pub fn data_path(path: &str) -> Self {
        let owned = path.to_string();
        Self::new(path, move |suggestion| {
            suggestion.data.as_ref().and_then(|data| get_text(data, &owned))
        })
    }

    pub fn with_stopwords<S: AsRef<str>>(mut self, stopwords: &[S]) -> Self {
        self.stopwords = stopwords.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn words(&self, suggestion: &Suggestion) -> Vec<String> {
        match (self.get)(suggestion) {
            Some(text) if !text.is_empty() => split_tokens(&split(&text, self.stopwords.as_slice())),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// Whole query against whole values, stopwords removed.
    NormalizedQuery { stopwords: Vec<String> },
    /// Query words as a subset of value words, for values sharing one root.
    Words { stopwords: Vec<String> },
    /// Query words as prefixes of field words of a single candidate.
    Fields(Vec<FieldAccessor>),
}

fn owned<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words.iter().map(|s| s.as_ref().to_string()).collect()
}

fn normalize(text: &str, stopwords: &[String]) -> String {
    split(text, stopwords).join(" ")
}

/// The query already contains the whole candidate: it has been selected.
fn encloses(query: &str, value: &str) -> bool {
    query.chars().count() > value.chars().count() && query.to_lowercase().contains(&value.to_lowercase())
}

/// `true` for a single candidate, or when every value extends the first one.
pub fn have_same_parent(suggestions: &[Suggestion]) -> bool {
    match suggestions {
        [] => false,
        [_] => true,
        [first, rest @ ..] => rest.iter().all(|s| s.value.starts_with(first.value.as_str())),
    }
}

fn sole(matches: &[usize]) -> Option<usize> {
    match matches {
        [index] => Some(*index),
        _ => None,
    }
}

impl Matcher {
    pub fn by_normalized_query<S: AsRef<str>>(stopwords: &[S]) -> Self {
        Matcher::NormalizedQuery { stopwords: owned(stopwords) }
    }

    pub fn by_words<S: AsRef<str>>(stopwords: &[S]) -> Self {
        Matcher::Words { stopwords: owned(stopwords) }
    }

    pub fn by_fields(accessors: Vec<FieldAccessor>) -> Self {
        Matcher::Fields(accessors)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Matcher::NormalizedQuery { .. } => "normalized_query",
            Matcher::Words { .. } => "words",
            Matcher::Fields(_) => "fields",
        }
    }

    /// Index of the single suggestion matching `query`.
    pub fn find(&self, query: &str, suggestions: &[Suggestion]) -> Option<usize> {
        if query.trim().is_empty() {
            return None;
        }
        match self {
            Matcher::NormalizedQuery { stopwords } => match_normalized_query(query, suggestions, stopwords),
            Matcher::Words { stopwords } => match_words(query, suggestions, stopwords),
            Matcher::Fields(accessors) => match_fields(query, suggestions, accessors),
        }
    }
}

fn match_normalized_query(query: &str, suggestions: &[Suggestion], stopwords: &[String]) -> Option<usize> {
    let normalized_query = normalize(query, stopwords);
    let mut matches = Vec::new();

    for (i, suggestion) in suggestions.iter().enumerate() {
        let value = suggestion.value.to_lowercase();
        if encloses(query, &value) {
            break;
        }
        // a value containing the query in the middle makes every match doubtful
        if value.find(&normalized_query).map_or(false, |pos| pos > 0) {
            return None;
        }
        if normalized_query == normalize(&value, stopwords) {
            matches.push(i);
        }
    }

    sole(&matches)
}

fn match_words(query: &str, suggestions: &[Suggestion], stopwords: &[String]) -> Option<usize> {
    if !have_same_parent(suggestions) {
        return None;
    }

    let query_tokens = split_tokens(&split(query, stopwords));
    let mut matches = Vec::new();

    for (i, suggestion) in suggestions.iter().enumerate() {
        if encloses(query, &suggestion.value) {
            break;
        }
        let words = split_tokens(&split(&suggestion.value, stopwords));
        if array_minus(&query_tokens, &words).is_empty() {
            matches.push(i);
        }
    }

    sole(&matches)
}

fn match_fields(query: &str, suggestions: &[Suggestion], accessors: &[FieldAccessor]) -> Option<usize> {
    let [suggestion] = suggestions else {
        return None;
    };

    let tokens = split_tokens(&split(query, &[] as &[&str]));
    let pool: Vec<String> = accessors.iter().flat_map(|accessor| accessor.words(suggestion)).collect();

    let all_found = tokens
        .iter()
        .all(|token| pool.iter().any(|word| word.starts_with(token.as_str())));
    all_found.then_some(0)
}

/// Runs matchers in order; the first one that finds something wins.
pub fn find_match(matchers: &[Matcher], query: &str, suggestions: &[Suggestion]) -> Option<usize> {
    matchers.iter().find_map(|matcher| {
        let found = matcher.find(query, suggestions);
        if let Some(index) = found {
            debug!(matcher = matcher.name(), index, "Query matched a suggestion");
        }
        found
    })
}
