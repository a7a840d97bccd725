pub mod core;
pub mod matcher;
pub mod processor;
pub mod types;


pub use types::*;
pub use core::{highlight_chunks, highlight_chunks_with, highlight_matches, highlight_matches_with, render_html};
pub use processor::HighlightProcessor;
