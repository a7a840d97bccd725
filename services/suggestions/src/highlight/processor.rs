use crate::error::Result;
use crate::highlight::core::{highlight_chunks_with, highlight_matches_with, render_html};
use crate::highlight::types::*;

/// Highlighter bound to one markup configuration.
#[derive(Debug, Clone, Default)]
pub struct HighlightProcessor {
    config: HighlightConfig,
}

impl HighlightProcessor {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn from_style(style: &HighlightStyle) -> Result<Self> {
        Ok(Self::new(HighlightConfig::from_style(style)?))
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn chunks(&self, value: &str, query: &str, options: &HighlightOptions) -> Vec<HighlightChunk> {
        highlight_chunks_with(value, query, options, &self.config)
    }

    pub fn highlight(&self, value: &str, query: &str, options: &HighlightOptions) -> String {
        highlight_matches_with(value, query, options, &self.config)
    }

    pub fn render(&self, chunks: &[HighlightChunk]) -> String {
        render_html(chunks, &self.config)
    }

    /// Highlights every value against the same query.
    pub fn highlight_all<S: AsRef<str>>(
        &self,
        values: &[S],
        query: &str,
        options: &HighlightOptions,
    ) -> Vec<String> {
        values
            .iter()
            .map(|value| self.highlight(value.as_ref(), query, options))
            .collect()
    }

    /// Of two renderings prefers `alt` only when it highlights something
    /// and `main` doesn't.
    pub fn choose<'a>(&self, main: &'a str, alt: &'a str) -> &'a str {
        if self.config.has_match(alt) && !self.config.has_match(main) {
            alt
        } else {
            main
        }
    }
}
