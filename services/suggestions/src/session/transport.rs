//! Transport seam between a session and the suggestions service.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{Result, TransportError};
use crate::r#type::Suggestion;

/// Fetches suggestions for a request.
///
/// `method` is `"suggest"` for regular queries and the type's enrichment
/// method (`"findById"`, `"suggest"`) for enrichment requests.
#[async_trait]
pub trait SuggestionTransport: Send + Sync {
    async fn fetch_suggestions(
        &self,
        method: &str,
        url_suffix: &str,
        params: &Map<String, Value>,
    ) -> Result<Vec<Suggestion>>;
}

/// A request seen by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub url_suffix: String,
    pub params: Map<String, Value>,
}

/// Answers from canned responses keyed by method and query.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: HashMap<(String, String), Vec<Suggestion>>,
    fallback: Vec<Suggestion>,
    failing: bool,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request gets `suggestions` unless a response was registered for it.
    pub fn with_suggestions(suggestions: Vec<Suggestion>) -> Self {
        MemoryTransport {
            fallback: suggestions,
            ..Default::default()
        }
    }

    /// A transport whose requests all fail.
    pub fn failing() -> Self {
        MemoryTransport {
            failing: true,
            ..Default::default()
        }
    }

    pub fn respond(mut self, method: &str, query: &str, suggestions: Vec<Suggestion>) -> Self {
        self.responses
            .insert((method.to_string(), query.to_string()), suggestions);
        self
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SuggestionTransport for MemoryTransport {
    async fn fetch_suggestions(
        &self,
        method: &str,
        url_suffix: &str,
        params: &Map<String, Value>,
    ) -> Result<Vec<Suggestion>> {
        self.requests.lock().await.push(RecordedRequest {
            method: method.to_string(),
            url_suffix: url_suffix.to_string(),
            params: params.clone(),
        });

        if self.failing {
            return Err(TransportError::Request(format!("{method}/{url_suffix} is unavailable")).into());
        }

        let query = params
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(self
            .responses
            .get(&(method.to_string(), query))
            .unwrap_or(&self.fallback)
            .clone())
    }
}
