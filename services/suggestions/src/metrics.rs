use metrics::{counter, describe_counter, describe_histogram, histogram, Counter, Histogram};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Directives used when `RUST_LOG` is not set.
pub fn default_log_directives(logging: &LoggingConfig) -> String {
    format!("suggestions={}", logging.level.trim())
}

/// `RUST_LOG` wins over the configured level.
pub fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_directives(logging)))
}

pub fn init_logging(logging: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(logging))
        .with_writer(std::io::stderr)
        .init();
}

/// Counters of one session, labelled with the suggestion type.
#[derive(Clone)]
pub struct Metrics {
    pub fetch_total: Counter,
    pub fetch_errors: Counter,
    pub match_total: Counter,
    pub select_total: Counter,
    pub select_nothing_total: Counter,
    pub enrichment_total: Counter,
    pub cache_hits: Counter,
    pub fetched_suggestions: Histogram,
}

impl Metrics {
    pub fn new(suggestion_type: &str) -> Self {
        let kind = suggestion_type.to_string();
        Metrics {
            fetch_total: counter!("suggestions_fetch_total", "type" => kind.clone()),
            fetch_errors: counter!("suggestions_fetch_errors_total", "type" => kind.clone()),
            match_total: counter!("suggestions_match_total", "type" => kind.clone()),
            select_total: counter!("suggestions_select_total", "type" => kind.clone()),
            select_nothing_total: counter!("suggestions_select_nothing_total", "type" => kind.clone()),
            enrichment_total: counter!("suggestions_enrichment_total", "type" => kind.clone()),
            cache_hits: counter!("suggestions_cache_hits_total", "type" => kind.clone()),
            fetched_suggestions: histogram!("suggestions_fetched_count", "type" => kind),
        }
    }

    /// Registers descriptions with the installed recorder.
    pub fn describe() {
        describe_counter!("suggestions_fetch_total", "Total number of suggestion requests");
        describe_counter!("suggestions_fetch_errors_total", "Total number of failed suggestion requests");
        describe_counter!("suggestions_match_total", "Total number of inputs matched to a suggestion");
        describe_counter!("suggestions_select_total", "Total number of selected suggestions");
        describe_counter!("suggestions_select_nothing_total", "Total number of selections that found nothing");
        describe_counter!("suggestions_enrichment_total", "Total number of enrichment requests");
        describe_counter!("suggestions_cache_hits_total", "Total number of responses served from cache");
        describe_histogram!("suggestions_fetched_count", "Number of suggestions per response");
    }

    pub fn record_fetch(&self, count: usize) {
        self.fetch_total.increment(1);
        self.fetched_suggestions.record(count as f64);
    }

    pub fn record_fetch_error(&self) {
        self.fetch_errors.increment(1);
    }

    pub fn record_match(&self) {
        self.match_total.increment(1);
    }

    pub fn record_select(&self) {
        self.select_total.increment(1);
    }

    pub fn record_select_nothing(&self) {
        self.select_nothing_total.increment(1);
    }

    pub fn record_enrichment(&self) {
        self.enrichment_total.increment(1);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_reaches_filter() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
        };
        assert_eq!(default_log_directives(&logging), "suggestions=debug");
        assert_eq!(EnvFilter::new(default_log_directives(&logging)).to_string(), "suggestions=debug");
    }

    #[test]
    fn test_metrics_without_recorder() {
        Metrics::describe();
        let metrics = Metrics::new("ADDRESS");
        metrics.record_fetch(3);
        metrics.record_match();
        metrics.record_select();
        metrics.record_cache_hit();
    }
}
