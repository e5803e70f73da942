//! Filters applied to a token stream after tokenization.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Transforms a token stream.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use hanseg::analysis::token::Token;
    /// use hanseg::analysis::token_filter::Filter;
    /// use hanseg::analysis::token_filter::stop::StopFilter;
    ///
    /// let filter = StopFilter::from_words(["的"]);
    /// let tokens = vec![Token::new("我", 0), Token::new("的", 1)];
    /// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
    ///     .unwrap()
    ///     .collect();
    /// assert_eq!(result.len(), 1);
    /// ```
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod stop;
