//! Tokenizers: the first step of the analysis pipeline.
//!
//! A tokenizer splits text into [`Token`](crate::analysis::token::Token)s.
//! [`hanlp::HanlpTokenizer`] adapts any segmentation engine built by the
//! [`factory`](crate::factory) to this interface.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Splits text into a token stream.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text`.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod hanlp;
