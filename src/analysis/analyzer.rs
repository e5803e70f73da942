//! Analyzers: a tokenizer followed by token filters.
//!
//! ```text
//! Raw Text → Analyzer → Token Stream
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 … Filter N
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// The complete analysis of a text.
pub trait Analyzer: Send + Sync {
    /// Analyze `text` into tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    fn name(&self) -> &str;
}

pub mod pipeline;
