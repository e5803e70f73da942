//! Token types produced by the tokenizers.
//!
//! # Core Types
//!
//! - [`Token`] - One token with text, position, byte offsets and metadata
//! - [`TokenType`] - Classification of token content (alphanumeric, CJK, etc.)
//! - [`TokenMetadata`] - Additional metadata attached to tokens
//! - [`TokenStream`] - Type alias for boxed iterator of tokens
//!
//! # Overlapping tokens
//!
//! In index mode a long word is followed by the shorter words it contains.
//! Those sub-words share the position of the word (`position_increment` 0):
//!
//! ```text
//! Input: "中华人民共和国"
//!
//!   Position 0: "中华人民共和国" (pos_inc=1)
//!   Position 0: "中华"           (pos_inc=0)
//!   Position 0: "人民"           (pos_inc=0)
//!   Position 0: "共和国"         (pos_inc=0)
//! ```
//!
//! # Examples
//!
//! ```
//! use hanseg::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("中国", 0, 0, 6)
//!     .with_token_type(TokenType::Cjk)
//!     .with_attribute("pos", "ns");
//!
//! assert_eq!(token.start_offset, 0);
//! assert_eq!(token.end_offset, 6);
//! assert_eq!(token.attribute("pos"), Some("ns"));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::segment::atom::is_cjk;

/// A token represents a single unit of text after tokenization.
///
/// # Fields
///
/// - `text` - The token's text content
/// - `position` - Position in the token stream (0-based)
/// - `start_offset` / `end_offset` - Byte offsets in original text
/// - `stopped` - Whether the token was marked for removal
/// - `position_increment` - Position relative to previous token (default: 1)
/// - `metadata` - Optional additional metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped by a filter
    pub stopped: bool,

    /// Additional metadata that can be attached to tokens
    pub metadata: Option<TokenMetadata>,

    /// Position increment from the previous token (default: 1).
    ///
    /// - 1 (default): Normal increment, next position
    /// - 0: Same position as previous token (index-mode sub-words)
    pub position_increment: usize,
}

/// Token type classification for different kinds of tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Alphanumeric text (English, Latin scripts)
    Alphanum,
    /// Numeric values
    Num,
    /// CJK (Chinese, Japanese, Korean) characters
    Cjk,
    /// Punctuation marks
    Punctuation,
    /// Whitespace
    Whitespace,
    /// Other/unknown token types
    Other,
}

impl TokenType {
    /// Classify `text` by its characters.
    pub fn detect(text: &str) -> TokenType {
        if text.is_empty() {
            return TokenType::Other;
        }
        if text.chars().any(is_cjk) {
            return TokenType::Cjk;
        }
        if text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return TokenType::Num;
        }
        if text.chars().all(char::is_alphanumeric) {
            return TokenType::Alphanum;
        }
        if text.chars().all(char::is_whitespace) {
            return TokenType::Whitespace;
        }
        if text.chars().all(|c| !c.is_alphanumeric()) {
            return TokenType::Punctuation;
        }
        TokenType::Other
    }
}

/// Additional metadata that can be attached to tokens
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token type classification
    pub token_type: Option<TokenType>,

    /// Additional attributes, such as the part of speech under `pos`
    pub attributes: HashMap<String, String>,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            stopped: false,
            metadata: None,
            position_increment: 1,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            start_offset,
            end_offset,
            ..Token::new(text, position)
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Get a reference to the metadata.
    pub fn metadata(&self) -> Option<&TokenMetadata> {
        self.metadata.as_ref()
    }

    /// Set the token type in metadata.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        let metadata = self.metadata.get_or_insert_with(TokenMetadata::default);
        metadata.token_type = Some(token_type);
        self
    }

    /// The token type, if set.
    pub fn token_type(&self) -> Option<TokenType> {
        self.metadata.as_ref().and_then(|m| m.token_type)
    }

    /// Set a custom attribute.
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        let metadata = self.metadata.get_or_insert_with(TokenMetadata::default);
        metadata.set_attribute(key, value);
        self
    }

    /// Get a custom attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.get_attribute(key))
    }

    /// Set the position increment.
    pub fn with_position_increment(mut self, increment: usize) -> Self {
        self.position_increment = increment;
        self
    }
}

impl TokenMetadata {
    /// Set a custom attribute.
    pub fn set_attribute<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes.insert(key.into(), value.into());
    }

    /// Get a custom attribute.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|s| s.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}
