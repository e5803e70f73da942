//! Token stream adapters over the segmentation engines.
//!
//! - [`tokenizer::hanlp::HanlpTokenizer`] turns segmented terms into tokens
//! - [`token_filter::stop::StopFilter`] drops stop words
//! - [`analyzer::pipeline::PipelineAnalyzer`] chains a tokenizer with filters

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
