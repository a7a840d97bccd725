pub mod address;
pub mod charset;
pub mod common;
pub mod config;
pub mod error;
pub mod highlight;
pub mod matcher;
pub mod metrics;
pub mod session;
pub mod tokenizer;
pub mod r#type;

pub use address::{
    compose_address_value, fias_specificity, kladr_specificity, significant_kladr_id, Bounds, ComposeOptions,
    ConstraintSpec, Constraints, ADDRESS_COMPONENTS, ADDRESS_STOPWORDS,
};
pub use config::*;
pub use error::*;
pub use highlight::{highlight_chunks, highlight_matches, HighlightChunk, HighlightOptions, HighlightProcessor};
pub use matcher::{find_match, FieldAccessor, Matcher};
pub use crate::metrics::Metrics;
pub use session::{
    MemoryTransport, SelectOutcome, SelectionOptions, Session, SessionOptions, SuggestionTransport,
};
pub use tokenizer::{split, split_tokens, tokenize, Token};
pub use r#type::{Classes, Suggestion, SuggestionType};
