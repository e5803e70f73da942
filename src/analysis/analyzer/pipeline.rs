//! Pipeline analyzer that combines a tokenizer and filters.
//!
//! Filters are applied sequentially in the order they were added.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use hanseg::analysis::analyzer::Analyzer;
//! use hanseg::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use hanseg::analysis::token_filter::stop::StopFilter;
//! use hanseg::factory::TokenizerFactory;
//! use hanseg::settings::{Environment, Settings};
//!
//! let dir = tempfile::tempdir().unwrap();
//! hanseg::testing::write_models(dir.path()).unwrap();
//! let env = Environment::with_root(dir.path());
//!
//! let tokenizer = TokenizerFactory::standard(&env, &Settings::new())
//!     .unwrap()
//!     .create()
//!     .unwrap();
//! let analyzer = PipelineAnalyzer::new(Arc::new(tokenizer))
//!     .add_filter(Arc::new(StopFilter::from_words(["在"])));
//!
//! let tokens: Vec<_> = analyzer.analyze("我在北京").unwrap().map(|t| t.text).collect();
//! assert_eq!(tokens, vec!["我", "北京"]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer followed by a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create an analyzer with no filters.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Append a filter.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Rename the analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// The tokenizer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// The filters, in application order.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
