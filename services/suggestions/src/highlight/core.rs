use std::collections::VecDeque;

use regex::Regex;

use crate::charset::{format_token, has_upper_case, split_at_char, WORD_DELIMITERS};
use crate::common::escape_html;
use crate::highlight::matcher::{find_token_match, token_patterns, TokenMatch};
use crate::highlight::types::*;
use crate::tokenizer::tokenize;

lazy_static::lazy_static! {
    static ref WORDS: Regex =
        Regex::new(&format!("([^{d}]*)([{d}]*)", d = WORD_DELIMITERS)).unwrap();
}

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    normalized: String,
    has_upper_case: bool,
    matchable: bool,
    matched: bool,
}

impl Chunk {
    fn word(text: &str) -> Self {
        Chunk {
            text: text.to_string(),
            normalized: format_token(text),
            has_upper_case: has_upper_case(text),
            matchable: true,
            matched: false,
        }
    }

    /// A word carved out of a bigger word; it doesn't inherit the casing signal.
    fn piece(text: &str, normalized: &str) -> Self {
        Chunk {
            text: text.to_string(),
            normalized: normalized.to_string(),
            has_upper_case: false,
            matchable: true,
            matched: false,
        }
    }

    fn plain(text: &str) -> Self {
        Chunk {
            text: text.to_string(),
            normalized: text.to_string(),
            has_upper_case: false,
            matchable: false,
            matched: false,
        }
    }

    fn is_candidate<S: AsRef<str>>(&self, unformattable_tokens: &[S]) -> bool {
        self.matchable
            && !self.matched
            && (self.has_upper_case
                || !unformattable_tokens
                    .iter()
                    .any(|token| token.as_ref() == self.normalized))
    }

    /// Splits the chunk around a match, in display order.
    fn split(self, found: &TokenMatch) -> Vec<Chunk> {
        let mut pieces = Vec::with_capacity(5);
        let mut text = self.text.as_str();
        let mut normalized = self.normalized.as_str();

        if !found.before.is_empty() {
            let before_text_len = found.before_text.chars().count();
            pieces.push(Chunk::piece(split_at_char(text, before_text_len).0, found.before_text));
            pieces.push(Chunk::plain(found.before_delimiter));

            let before_len = found.before.chars().count();
            text = split_at_char(text, before_len).1;
            normalized = split_at_char(normalized, before_len).1;
        }

        let mut tail = Vec::with_capacity(2);
        let matched_len = found.text.chars().count() + found.after.chars().count();
        if normalized.chars().count() > matched_len {
            let (text_head, text_rest) = split_at_char(text, matched_len);
            let (norm_head, norm_rest) = split_at_char(normalized, matched_len);
            tail.push(Chunk::piece(text_rest, norm_rest));
            text = text_head;
            normalized = norm_head;
        }

        if !found.after.is_empty() {
            let token_len = found.text.chars().count();
            let (text_head, text_rest) = split_at_char(text, token_len);
            tail.insert(0, Chunk::plain(text_rest));
            text = text_head;
            normalized = split_at_char(normalized, token_len).0;
        }

        pieces.push(Chunk {
            text: text.to_string(),
            normalized: normalized.to_string(),
            has_upper_case: self.has_upper_case,
            matchable: true,
            matched: true,
        });
        pieces.extend(tail);
        pieces
    }
}

/// Splits a value into alternating word and delimiter chunks.
fn parse_chunks(value: &str) -> VecDeque<Chunk> {
    let mut chunks = VecDeque::new();
    for caps in WORDS.captures_iter(value) {
        let word = caps.get(1).map_or("", |m| m.as_str());
        let delimiter = caps.get(2).map_or("", |m| m.as_str());
        if word.is_empty() && delimiter.is_empty() {
            continue;
        }
        if !word.is_empty() {
            chunks.push_back(Chunk::word(word));
        }
        if !delimiter.is_empty() {
            chunks.push_back(Chunk::plain(delimiter));
        }
    }
    chunks
}

/// Runs the query patterns over a queue of pending chunks.
///
/// A matched chunk is split into up to five pieces which go back to the
/// front of the queue, so the words carved out of it get their own turn.
fn mark_matches<S: AsRef<str>>(
    mut pending: VecDeque<Chunk>,
    patterns: &[Regex],
    unformattable_tokens: &[S],
) -> Vec<Chunk> {
    let mut done = Vec::with_capacity(pending.len());

    while let Some(chunk) = pending.pop_front() {
        if !chunk.is_candidate(unformattable_tokens) {
            done.push(chunk);
            continue;
        }

        let normalized = chunk.normalized.clone();
        match find_token_match(patterns, &normalized) {
            Some(found) => {
                for piece in chunk.split(&found).into_iter().rev() {
                    pending.push_front(piece);
                }
            }
            None => done.push(chunk),
        }
    }
    done
}

/// Cuts the chunks to `max_length` visible characters, marking the cut.
fn truncate(chunks: Vec<Chunk>, max_length: usize, ellipsis: &str) -> Vec<Chunk> {
    let mut budget = max_length as i64;
    let mut kept = Vec::with_capacity(chunks.len());

    for mut chunk in chunks {
        if budget < 0 {
            break;
        }
        let len = chunk.text.chars().count() as i64;
        budget -= len;
        if budget < 0 {
            let visible = (len + budget).max(0) as usize;
            chunk.text = format!("{}{}", split_at_char(&chunk.text, visible).0, ellipsis);
        }
        kept.push(chunk);
    }
    kept
}

/// Splits `value` into plain and matched pieces for `query`.
pub fn highlight_chunks_with(
    value: &str,
    query: &str,
    options: &HighlightOptions,
    config: &HighlightConfig,
) -> Vec<HighlightChunk> {
    if value.is_empty() {
        return Vec::new();
    }

    let stopwords = options.unformattable_tokens.as_slice();
    let tokens = tokenize(query, stopwords);
    let patterns = token_patterns(&tokens);
    let mut chunks = mark_matches(parse_chunks(value), &patterns, stopwords);

    if let Some(max_length) = options.max_length.filter(|len| *len > 0) {
        chunks = truncate(chunks, max_length, &config.ellipsis);
    }

    chunks
        .into_iter()
        .map(|chunk| HighlightChunk {
            text: chunk.text,
            matched: chunk.matched,
        })
        .collect()
}

/// Wraps comma-separated parts so they don't break inside.
fn nowrap_linked_parts(html: &str, nowrap_class: &str) -> String {
    let parts: Vec<&str> = html.split(", ").collect();
    if parts.len() < 2 {
        return html.to_string();
    }
    parts
        .iter()
        .map(|part| format!("<span class=\"{}\">{}</span>", nowrap_class, part))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders chunks as escaped HTML with matches wrapped in markup.
pub fn render_html(chunks: &[HighlightChunk], config: &HighlightConfig) -> String {
    let html: String = chunks
        .iter()
        .map(|chunk| {
            let text = escape_html(&chunk.text);
            if chunk.matched && !text.is_empty() {
                format!("{}{}{}", config.markup_open, text, config.markup_close)
            } else {
                text
            }
        })
        .collect();
    nowrap_linked_parts(&html, &config.nowrap_class)
}

pub fn highlight_matches_with(
    value: &str,
    query: &str,
    options: &HighlightOptions,
    config: &HighlightConfig,
) -> String {
    let chunks = highlight_chunks_with(value, query, options, config);
    if chunks.is_empty() {
        return String::new();
    }
    render_html(&chunks, config)
}

lazy_static::lazy_static! {
    static ref DEFAULT_CONFIG: HighlightConfig = HighlightConfig::default();
}

/// [`highlight_chunks_with`] using the default markup.
pub fn highlight_chunks(value: &str, query: &str, options: &HighlightOptions) -> Vec<HighlightChunk> {
    highlight_chunks_with(value, query, options, &DEFAULT_CONFIG)
}

/// Highlights `query` in `value` as HTML with the default markup.
pub fn highlight_matches(value: &str, query: &str, options: &HighlightOptions) -> String {
    highlight_matches_with(value, query, options, &DEFAULT_CONFIG)
}
