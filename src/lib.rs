//! # hanseg
//!
//! Chinese word segmentation tokenizers with pluggable strategies.
//!
//! ## Features
//!
//! - Eight segmentation strategies selected by tokenizer type name
//! - Process-wide model registry: each model is read at most once
//! - CRF composites degrade gracefully when optional models are missing
//! - Model loading confined to the configured directories
//! - Index mode with overlapping sub-word tokens
//!
//! ```
//! use hanseg::analysis::tokenizer::Tokenizer;
//! use hanseg::factory::TokenizerFactory;
//! use hanseg::settings::{Environment, Settings};
//!
//! let dir = tempfile::tempdir().unwrap();
//! hanseg::testing::write_models(dir.path()).unwrap();
//!
//! let env = Environment::with_root(dir.path());
//! let factory = TokenizerFactory::from_name("hanlp", &env, &Settings::new()).unwrap();
//! let texts: Vec<_> = factory
//!     .create()
//!     .unwrap()
//!     .tokenize("我在北京")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(texts, vec!["我", "在", "北京"]);
//! ```

pub mod analysis;
pub mod cli;
pub mod configuration;
pub mod error;
pub mod factory;
pub mod isolation;
pub mod model;
pub mod segment;
pub mod settings;

#[doc(hidden)]
pub mod testing;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
