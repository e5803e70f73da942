//! Stop filter implementation.
//!
//! Removes tokens whose text is in a stop word list, typically the list the
//! factory loads when `enable_stop_dictionary` is set.
//!
//! # Examples
//!
//! ```
//! use hanseg::analysis::token::Token;
//! use hanseg::analysis::token_filter::Filter;
//! use hanseg::analysis::token_filter::stop::StopFilter;
//!
//! let filter = StopFilter::from_words(["的", "了"]);
//! let tokens = vec![
//!     Token::new("我", 0),
//!     Token::new("的", 1),
//!     Token::new("书", 2),
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "我");
//! assert_eq!(result[1].text, "书");
//! ```

use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;
use crate::model::StopWords;

/// A filter that removes stop words from the token stream.
///
/// Stopped tokens can also be kept and only marked, see
/// [`StopFilter::remove_stopped`].
///
/// ```
/// use hanseg::analysis::token::Token;
/// use hanseg::analysis::token_filter::Filter;
/// use hanseg::analysis::token_filter::stop::StopFilter;
///
/// let filter = StopFilter::from_words(["的"]).remove_stopped(false);
/// let tokens = vec![Token::new("的", 0), Token::new("书", 1)];
///
/// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .collect();
///
/// assert_eq!(result.len(), 2);
/// assert!(result[0].is_stopped());
/// assert!(!result[1].is_stopped());
/// ```
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<StopWords>,
    /// Whether to remove stopped tokens entirely or just mark them as stopped
    remove_stopped: bool,
}

impl StopFilter {
    /// Create a stop filter over a loaded stop word list.
    pub fn new(stop_words: Arc<StopWords>) -> Self {
        StopFilter {
            stop_words,
            remove_stopped: true,
        }
    }

    /// Create a new stop filter from a list of stop words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Arc::new(StopWords::from_words(words)))
    }

    /// Set whether to remove stopped tokens entirely or just mark them as stopped.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Filter for StopFilter {
    /// Removed tokens pass their position increment on to the next kept
    /// token, so each increment still equals the gap to the previous
    /// position.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut filtered_tokens = Vec::new();
        let mut skipped = 0;
        for token in tokens {
            if !token.is_stopped() && self.is_stop_word(&token.text) {
                if self.remove_stopped {
                    skipped += token.position_increment;
                    continue;
                }
                filtered_tokens.push(token.stop());
                continue;
            }
            let increment = token.position_increment + skipped;
            skipped = 0;
            filtered_tokens.push(token.with_position_increment(increment));
        }

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_filter() {
        let filter = StopFilter::from_words(["的", "了", "是"]);
        let tokens = vec![
            Token::new("这", 0),
            Token::new("是", 1),
            Token::new("我", 2),
            Token::new("的", 3),
            Token::new("书", 4),
        ];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        let texts: Vec<_> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["这", "我", "书"]);
        // Positions are left as assigned by the tokenizer.
        assert_eq!(result[2].position, 4);
    }

    #[test]
    fn test_removed_tokens_carry_their_increment() {
        let filter = StopFilter::from_words(["的", "了"]);
        let tokens = vec![
            Token::new("我", 0),
            Token::new("的", 1),
            Token::new("了", 2),
            Token::new("中国", 3),
            Token::new("中", 3).with_position_increment(0),
        ];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        let layout: Vec<_> = result
            .iter()
            .map(|t| (t.text.as_str(), t.position, t.position_increment))
            .collect();
        assert_eq!(layout, vec![("我", 0, 1), ("中国", 3, 3), ("中", 3, 0)]);
    }

    #[test]
    fn test_stop_filter_preserve_stopped() {
        let filter = StopFilter::from_words(["了"]).remove_stopped(false);
        let tokens = vec![Token::new("来", 0), Token::new("了", 1)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result.len(), 2);
        assert!(!result[0].is_stopped());
        assert!(result[1].is_stopped());
    }

    #[test]
    fn test_filter_name() {
        let filter = StopFilter::from_words(Vec::<String>::new());
        assert_eq!(filter.name(), "stop");
        assert!(filter.is_empty());
    }
}
