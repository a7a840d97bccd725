use serde::{Deserialize, Serialize};

use crate::error::{HighlightError, Result};

pub const DEFAULT_TEMPLATE: &str = "<strong>$1</strong>";
pub const DEFAULT_NOWRAP_CLASS: &str = "suggestions-nowrap";
pub const DEFAULT_ELLIPSIS: &str = "...";

/// Per-call highlighting options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightOptions {
    /// Words that are never highlighted unless written with capitals.
    #[serde(default)]
    pub unformattable_tokens: Vec<String>,
    /// Visible length limit; `None` or `0` means unlimited.
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl HighlightOptions {
    pub fn with_stopwords<S: AsRef<str>>(stopwords: &[S]) -> Self {
        HighlightOptions {
            unformattable_tokens: stopwords.iter().map(|s| s.as_ref().to_string()).collect(),
            max_length: None,
        }
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// Markup settings as they appear in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub template: String,
    pub nowrap_class: String,
    pub ellipsis: String,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle {
            template: DEFAULT_TEMPLATE.to_string(),
            nowrap_class: DEFAULT_NOWRAP_CLASS.to_string(),
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    pub template: String,
    pub markup_open: String,
    pub markup_close: String,
    pub nowrap_class: String,
    pub ellipsis: String,
}

impl HighlightConfig {
    pub fn from_style(style: &HighlightStyle) -> Result<Self> {
        let template = style.template.clone();

        let markup_open_pos = template
            .find("$1")
            .ok_or_else(|| HighlightError::InvalidTemplate(template.clone()))?;

        let markup_open = template[..markup_open_pos].to_string();
        let markup_close = template[markup_open_pos + 2..].to_string();

        Ok(HighlightConfig {
            template,
            markup_open,
            markup_close,
            nowrap_class: style.nowrap_class.clone(),
            ellipsis: style.ellipsis.clone(),
        })
    }

    /// `true` if `html` contains highlighted markup.
    pub fn has_match(&self, html: &str) -> bool {
        !self.markup_open.is_empty() && html.contains(&self.markup_open)
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            template: DEFAULT_TEMPLATE.to_string(),
            markup_open: "<strong>".to_string(),
            markup_close: "</strong>".to_string(),
            nowrap_class: DEFAULT_NOWRAP_CLASS.to_string(),
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
        }
    }
}

/// A piece of a highlighted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightChunk {
    pub text: String,
    pub matched: bool,
}

impl HighlightChunk {
    pub fn plain(text: &str) -> Self {
        HighlightChunk {
            text: text.to_string(),
            matched: false,
        }
    }

    pub fn matched(text: &str) -> Self {
        HighlightChunk {
            text: text.to_string(),
            matched: true,
        }
    }
}
