//! Lattice engines: the default, standard, index, Dijkstra and N-shortest
//! strategies.

use std::sync::Arc;

use log::debug;

use crate::configuration::Configuration;
use crate::model::{BigramTable, Lexicon};
use crate::segment::index::IndexExpansion;
use crate::segment::path::{dijkstra, n_shortest, viterbi};
use crate::segment::recognition::Recognizer;
use crate::segment::text::CharSeq;
use crate::segment::word_net::WordNet;
use crate::segment::{Finisher, Segment, Term, Word};

/// Number of coarse paths the N-shortest strategy recognizes names on.
pub const DEFAULT_PATH_COUNT: usize = 2;

/// How the best path through the lattice is found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathAlgorithm {
    /// Dynamic programming over vertex positions.
    Viterbi,
    /// Dijkstra's shortest path.
    Dijkstra,
    /// Recognize names on the `n` best paths, then take the best one.
    NShortest(usize),
}

/// The dictionaries a lattice engine reads.
#[derive(Clone, Debug)]
pub struct Dictionaries {
    /// Core dictionary (mandatory).
    pub core: Arc<Lexicon>,
    /// Merged custom dictionaries, if any were loaded.
    pub custom: Option<Arc<Lexicon>>,
    /// Bigram table, if loaded.
    pub bigram: Option<Arc<BigramTable>>,
}

/// Segments each sentence by building its word lattice and searching it
/// for the lowest-cost path.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use hanseg::configuration::Configuration;
/// use hanseg::model::Lexicon;
/// use hanseg::segment::Segment;
/// use hanseg::segment::lattice::{Dictionaries, LatticeSegment, PathAlgorithm};
///
/// let core = Lexicon::parse_core("中国 ns 100\n人民 n 100\n").unwrap();
/// let dictionaries = Dictionaries { core: Arc::new(core), custom: None, bigram: None };
/// let config = Configuration::with_root("/unused");
/// let engine = LatticeSegment::new("hanlp", PathAlgorithm::Viterbi, dictionaries, &config);
///
/// let words: Vec<_> = engine.segment("中国人民").into_iter().map(|t| t.text).collect();
/// assert_eq!(words, vec!["中国", "人民"]);
/// ```
#[derive(Debug)]
pub struct LatticeSegment {
    name: &'static str,
    algorithm: PathAlgorithm,
    core: Arc<Lexicon>,
    custom: Option<Arc<Lexicon>>,
    bigram: Option<Arc<BigramTable>>,
    recognizer: Recognizer,
    normalize: bool,
    finisher: Finisher,
}

impl LatticeSegment {
    /// Create an engine honoring the toggles of `config`.
    ///
    /// Custom words join the lattice only when the custom dictionary is
    /// enabled; forcing additionally merges them over the chosen path.
    pub fn new(
        name: &'static str,
        algorithm: PathAlgorithm,
        dictionaries: Dictionaries,
        config: &Configuration,
    ) -> Self {
        let custom = dictionaries.custom.filter(|_| config.custom_dictionary);

        let mut finisher = Finisher::new().with_number_quantifier(config.number_quantifier_recognize);
        if let Some(custom) = custom.as_ref().filter(|_| config.custom_dictionary_forcing) {
            finisher = finisher.with_custom_merge(Arc::clone(custom));
        }
        if config.index_mode {
            let mut lexicons = vec![Arc::clone(&dictionaries.core)];
            lexicons.extend(custom.iter().cloned());
            finisher = finisher
                .with_index_expansion(IndexExpansion::new(lexicons, config.min_index_word_length));
        }

        LatticeSegment {
            name,
            algorithm,
            core: dictionaries.core,
            custom,
            bigram: dictionaries.bigram,
            recognizer: Recognizer::new(config.place_recognize, config.organization_recognize),
            normalize: config.normalization,
            finisher,
        }
    }

    /// The path search in use.
    pub fn algorithm(&self) -> PathAlgorithm {
        self.algorithm
    }

    /// Whether custom words are part of the lattice.
    pub fn uses_custom_dictionary(&self) -> bool {
        self.custom.is_some()
    }

    /// The name recognizer in use.
    pub fn recognizer(&self) -> Recognizer {
        self.recognizer
    }

    fn best_path(&self, net: &WordNet<'_>) -> Vec<usize> {
        let bigram = self.bigram.as_deref();
        match self.algorithm {
            PathAlgorithm::Viterbi => viterbi(net, bigram),
            PathAlgorithm::Dijkstra => dijkstra(net, bigram),
            PathAlgorithm::NShortest(_) => n_shortest(net, bigram, 1)
                .into_iter()
                .next()
                .unwrap_or_default(),
        }
    }

    fn coarse_paths(&self, net: &WordNet<'_>) -> Vec<Vec<usize>> {
        match self.algorithm {
            PathAlgorithm::NShortest(n) => n_shortest(net, self.bigram.as_deref(), n),
            _ => vec![self.best_path(net)],
        }
    }

    fn segment_sentence(&self, chars: &[char], offset: usize, words: &mut Vec<Word>) {
        let mut net = WordNet::build(chars, &self.core, self.custom.as_deref());

        if self.recognizer.is_enabled() {
            let mut added = 0;
            for path in self.coarse_paths(&net) {
                for entity in self.recognizer.recognize(&net, &path) {
                    if net.add_vertex(entity.vertex()) {
                        added += 1;
                    }
                }
            }
            if added > 0 {
                debug!("{}: {added} name candidates added to the lattice", self.name);
            }
        }

        let path = self.best_path(&net);
        words.extend(net.words(&path, offset));
    }
}

impl Segment for LatticeSegment {
    fn segment(&self, text: &str) -> Vec<Term> {
        let seq = CharSeq::new(text, self.normalize);
        let mut words = Vec::new();
        for sentence in seq.sentences() {
            let start = sentence.start;
            self.segment_sentence(&seq.chars()[sentence], start, &mut words);
        }
        self.finisher.finish(&seq, words)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionaries(core: &str, custom: Option<&str>) -> Dictionaries {
        Dictionaries {
            core: Arc::new(Lexicon::parse_core(core).unwrap()),
            custom: custom.map(|c| Arc::new(Lexicon::parse_custom(c).unwrap())),
            bigram: None,
        }
    }

    fn texts(terms: &[Term]) -> Vec<&str> {
        terms.iter().map(|t| t.text.as_str()).collect()
    }

    const CORE: &str = "我 r 100\n在 p 100\n区 n 50\n来 v 100\n了 ule 100\n攻 v 10\n";

    #[test]
    fn test_custom_dictionary_toggle() {
        let config = Configuration::with_root("/unused");
        let with = LatticeSegment::new(
            "hanlp",
            PathAlgorithm::Viterbi,
            dictionaries(CORE, Some("攻城狮\n")),
            &config,
        );
        assert_eq!(texts(&with.segment("攻城狮来了")), vec!["攻城狮", "来", "了"]);

        let config = config.enable_custom_dictionary(false);
        let without = LatticeSegment::new(
            "hanlp",
            PathAlgorithm::Viterbi,
            dictionaries(CORE, Some("攻城狮\n")),
            &config,
        );
        assert!(!without.uses_custom_dictionary());
        assert_eq!(texts(&without.segment("攻城狮来了")), vec!["攻", "城", "狮", "来", "了"]);
    }

    #[test]
    fn test_place_recognition() {
        let config = Configuration::with_root("/unused").enable_place_recognize(true);
        let engine = LatticeSegment::new(
            "hanlp_dijkstra",
            PathAlgorithm::Dijkstra,
            dictionaries(CORE, None),
            &config,
        );
        let terms = engine.segment("我在海淀区");

        assert_eq!(texts(&terms), vec!["我", "在", "海淀区"]);
        assert_eq!(terms[2].nature.as_deref(), Some("ns"));
    }

    #[test]
    fn test_n_shortest_with_recognition() {
        let config = Configuration::with_root("/unused").enable_place_recognize(true);
        let engine = LatticeSegment::new(
            "hanlp_n_short",
            PathAlgorithm::NShortest(DEFAULT_PATH_COUNT),
            dictionaries(CORE, None),
            &config,
        );
        assert_eq!(texts(&engine.segment("我在海淀区")), vec!["我", "在", "海淀区"]);
    }

    #[test]
    fn test_offsets_across_sentences() {
        let config = Configuration::with_root("/unused");
        let engine = LatticeSegment::new(
            "hanlp",
            PathAlgorithm::Viterbi,
            dictionaries(CORE, None),
            &config,
        );
        let terms = engine.segment("我来了。我在");

        assert_eq!(texts(&terms), vec!["我", "来", "了", "。", "我", "在"]);
        assert_eq!((terms[4].start, terms[4].end), (12, 15));
    }

    #[test]
    fn test_normalization_keeps_original_offsets() {
        let mut config = Configuration::with_root("/unused");
        config.normalization = true;
        let engine = LatticeSegment::new(
            "hanlp",
            PathAlgorithm::Viterbi,
            dictionaries(CORE, None),
            &config,
        );
        let terms = engine.segment("ＡＢＣ我");

        assert_eq!(texts(&terms), vec!["abc", "我"]);
        assert_eq!((terms[0].start, terms[0].end), (0, 9));
    }
}
