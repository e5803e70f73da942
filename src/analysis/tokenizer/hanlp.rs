//! Tokenizer over a segmentation engine.

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;
use crate::factory::SegmentationEngine;

/// Attribute key of the part of speech.
pub const POS_ATTRIBUTE: &str = "pos";

/// Turns the terms of a [`SegmentationEngine`] into tokens.
///
/// Offsets are byte offsets into the tokenized text. Index-mode sub-words
/// share the position of the term they were found in.
#[derive(Clone, Debug)]
pub struct HanlpTokenizer {
    engine: SegmentationEngine,
    part_of_speech: bool,
    stop_filter: Option<StopFilter>,
}

impl HanlpTokenizer {
    /// Create a tokenizer over `engine`.
    pub fn new(engine: SegmentationEngine) -> Self {
        HanlpTokenizer {
            engine,
            part_of_speech: false,
            stop_filter: None,
        }
    }

    /// Attach the part of speech of each term as the `pos` attribute.
    pub fn with_part_of_speech(mut self, enable: bool) -> Self {
        self.part_of_speech = enable;
        self
    }

    /// Drop stop words from the output.
    pub fn with_stop_filter(mut self, filter: StopFilter) -> Self {
        self.stop_filter = Some(filter);
        self
    }

    /// The engine in use.
    pub fn engine(&self) -> &SegmentationEngine {
        &self.engine
    }

    fn tokens(&self, text: &str) -> Vec<Token> {
        let terms = self.engine.segment(text);
        let mut tokens = Vec::with_capacity(terms.len());
        let mut position = 0;
        for (i, term) in terms.into_iter().enumerate() {
            let increment = if term.overlap { 0 } else { 1 };
            if i > 0 {
                position += increment;
            }
            let token_type = TokenType::detect(&term.text);
            let mut token = Token::with_offsets(term.text, position, term.start, term.end)
                .with_token_type(token_type)
                .with_position_increment(increment);
            if self.part_of_speech {
                if let Some(nature) = term.nature {
                    token = token.with_attribute(POS_ATTRIBUTE, nature);
                }
            }
            tokens.push(token);
        }
        tokens
    }
}

impl Tokenizer for HanlpTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: TokenStream = Box::new(self.tokens(text).into_iter());
        match &self.stop_filter {
            Some(filter) => filter.filter(tokens),
            None => Ok(tokens),
        }
    }

    fn name(&self) -> &'static str {
        self.engine.kind().name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::configuration::Configuration;
    use crate::factory::StrategyKind;
    use crate::model::Lexicon;
    use crate::segment::lattice::{Dictionaries, LatticeSegment, PathAlgorithm};

    fn tokenizer(config: &Configuration) -> HanlpTokenizer {
        let core = Lexicon::parse_core("中国 ns 100\n人民 n 100\n中国人民 n 10\n的 ude1 1000\n")
            .unwrap();
        let dictionaries = Dictionaries {
            core: Arc::new(core),
            custom: None,
            bigram: None,
        };
        let engine = LatticeSegment::new("hanlp_index", PathAlgorithm::Viterbi, dictionaries, config);
        HanlpTokenizer::new(SegmentationEngine::new(
            StrategyKind::IndexMode,
            Arc::new(engine),
        ))
    }

    #[test]
    fn test_offsets_and_positions() {
        let tokenizer = tokenizer(&Configuration::with_root("/unused"));
        let tokens: Vec<Token> = tokenizer.tokenize("中国人民的 2024").unwrap().collect();

        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["中国人民", "的", "2024"]);
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (12, 15));
        assert_eq!(tokens[2].start_offset, 16);
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(tokens[2].token_type(), Some(TokenType::Num));
        assert_eq!(tokenizer.name(), "hanlp_index");
    }

    #[test]
    fn test_index_sub_words_share_position() {
        let config = Configuration::with_root("/unused").enable_index_mode(true);
        let tokens: Vec<Token> = tokenizer(&config).tokenize("中国人民的").unwrap().collect();

        let layout: Vec<_> = tokens
            .iter()
            .map(|t| (t.text.as_str(), t.position, t.position_increment))
            .collect();
        assert_eq!(
            layout,
            vec![("中国人民", 0, 1), ("中国", 0, 0), ("人民", 0, 0), ("的", 1, 1)]
        );
    }

    #[test]
    fn test_part_of_speech_and_stop_words() {
        let tokenizer = tokenizer(&Configuration::with_root("/unused"))
            .with_part_of_speech(true)
            .with_stop_filter(StopFilter::from_words(["的"]));
        let tokens: Vec<Token> = tokenizer.tokenize("中国人民的").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].attribute(POS_ATTRIBUTE), Some("n"));
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = tokenizer(&Configuration::with_root("/unused"));
        assert_eq!(tokenizer.tokenize("").unwrap().count(), 0);
    }
}
