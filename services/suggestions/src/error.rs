use thiserror::Error;

impl From<serde_json::Error> for SuggestionsError {
    fn from(error: serde_json::Error) -> Self {
        SuggestionsError::JsonError(error.to_string())
    }
}

impl From<toml::de::Error> for SuggestionsError {
    fn from(error: toml::de::Error) -> Self {
        SuggestionsError::Config(ConfigError::Parse(error.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum SuggestionsError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Highlight error: {0}")]
    Highlight(#[from] HighlightError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request aborted")]
    Aborted,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("Invalid highlight template. The replacement pattern \"$1\" was not found in {0:?}")]
    InvalidTemplate(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, SuggestionsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::Aborted;
        assert_eq!(format!("{}", err), "Request aborted");
    }

    #[test]
    fn test_highlight_error() {
        let err = HighlightError::InvalidTemplate("<b></b>".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid highlight template. The replacement pattern \"$1\" was not found in \"<b></b>\""
        );
    }

    #[test]
    fn test_config_error_wraps() {
        let err: SuggestionsError = ConfigError::InvalidValue {
            field: "count".to_string(),
            value: "many".to_string(),
        }
        .into();
        assert_eq!(
            format!("{}", err),
            "Configuration error: Invalid value for count: many"
        );
    }
}
