//! The word lattice of one sentence.
//!
//! Every dictionary word that starts and ends on atom boundaries becomes a
//! vertex, and every atom gets a vertex of its own so that at least one
//! path always crosses the sentence. Two sentinel vertices mark the
//! sentence start and end. An edge joins `u` to `v` when `v` starts where
//! `u` ends; its weight is the bigram-smoothed cost of [`WordNet::cost`].

use ahash::AHashSet;

use crate::model::bigram::{BEGIN_WORD, END_WORD};
use crate::model::{BigramTable, Lexicon, LexiconEntry};
use crate::segment::Word;
use crate::segment::atom::{AtomKind, atoms};

/// Total word frequency of the reference corpus.
pub const MAX_FREQUENCY: f64 = 25_146_057.0;
const SMOOTHING: f64 = 0.1;
const TEMP: f64 = 1.0 / MAX_FREQUENCY + 0.00001;

/// Bigram key of number atoms.
pub const NUMBER_TAG: &str = "未##数";
/// Bigram key of Latin atoms.
pub const STRING_TAG: &str = "未##串";
/// Bigram key of recognized places.
pub const PLACE_TAG: &str = "未##地";
/// Bigram key of recognized organizations.
pub const ORGANIZATION_TAG: &str = "未##团";

/// Frequency of vertices whose key the core dictionary does not know.
const UNKNOWN_FREQUENCY: u32 = 1;

/// Where a vertex came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSource {
    /// Sentence start sentinel.
    Begin,
    /// Sentence end sentinel.
    End,
    /// Core dictionary word.
    Core,
    /// Custom dictionary word.
    Custom,
    /// Atom without a dictionary entry.
    Atom(AtomKind),
    /// Recognized entity.
    Entity,
}

/// One candidate word.
#[derive(Clone, Debug)]
pub struct Vertex {
    /// First character (relative to the sentence).
    pub start: usize,
    /// One past the last character.
    pub end: usize,
    /// Key used for bigram lookups.
    pub key: String,
    /// Part of speech.
    pub nature: Option<String>,
    /// Unigram frequency.
    pub frequency: u32,
    /// Origin.
    pub source: VertexSource,
}

/// The lattice of one sentence.
#[derive(Clone, Debug)]
pub struct WordNet<'a> {
    chars: &'a [char],
    vertices: Vec<Vertex>,
    by_start: Vec<Vec<usize>>,
    spans: AHashSet<(usize, usize)>,
    end: usize,
}

impl<'a> WordNet<'a> {
    /// Id of the sentence start sentinel.
    pub const BEGIN: usize = 0;

    /// Build the lattice of `chars` from the core dictionary and, when
    /// given, the custom dictionary.
    pub fn build(chars: &'a [char], core: &Lexicon, custom: Option<&Lexicon>) -> Self {
        let len = chars.len();
        let atoms = atoms(chars);
        let mut boundary = vec![false; len + 1];
        for atom in &atoms {
            boundary[atom.start] = true;
        }
        boundary[len] = true;

        let mut net = WordNet {
            chars,
            vertices: Vec::new(),
            by_start: vec![Vec::new(); len + 1],
            spans: AHashSet::new(),
            end: 0,
        };
        net.vertices.push(Vertex {
            start: 0,
            end: 0,
            key: BEGIN_WORD.to_string(),
            nature: None,
            frequency: frequency_of(core, BEGIN_WORD),
            source: VertexSource::Begin,
        });

        for atom in &atoms {
            let rest = &chars[atom.start..];
            let sources = [(Some(core), VertexSource::Core), (custom, VertexSource::Custom)];
            for (lexicon, source) in sources {
                let Some(lexicon) = lexicon else { continue };
                for (word_len, entry) in lexicon.prefixes(rest) {
                    if boundary[atom.start + word_len] {
                        net.add_entry(atom.start, atom.start + word_len, entry, source);
                    }
                }
            }
        }

        for atom in &atoms {
            let text: String = chars[atom.start..atom.end].iter().collect();
            let key = match atom.kind {
                AtomKind::Digit => NUMBER_TAG.to_string(),
                AtomKind::Latin => STRING_TAG.to_string(),
                _ => text,
            };
            let frequency = frequency_of(core, &key);
            net.add_vertex(Vertex {
                start: atom.start,
                end: atom.end,
                key,
                nature: atom.kind.nature().map(str::to_string),
                frequency,
                source: VertexSource::Atom(atom.kind),
            });
        }

        net.end = net.vertices.len();
        net.vertices.push(Vertex {
            start: len,
            end: len,
            key: END_WORD.to_string(),
            nature: None,
            frequency: frequency_of(core, END_WORD),
            source: VertexSource::End,
        });
        net.by_start[len].push(net.end);
        net
    }

    fn add_entry(&mut self, start: usize, end: usize, entry: &LexiconEntry, source: VertexSource) {
        self.add_vertex(Vertex {
            start,
            end,
            key: entry.word.clone(),
            nature: entry.nature().map(str::to_string),
            frequency: entry.frequency,
            source,
        });
    }

    /// Add a vertex unless one with the same span exists.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        if vertex.start >= vertex.end || !self.spans.insert((vertex.start, vertex.end)) {
            return false;
        }
        let id = self.vertices.len();
        self.by_start[vertex.start].push(id);
        self.vertices.push(vertex);
        true
    }

    /// Id of the sentence end sentinel.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of vertices, sentinels included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of characters in the sentence.
    pub fn char_len(&self) -> usize {
        self.chars.len()
    }

    /// The vertex with id `id`.
    pub fn vertex(&self, id: usize) -> &Vertex {
        &self.vertices[id]
    }

    /// Surface text of vertex `id`.
    pub fn text(&self, id: usize) -> String {
        let vertex = &self.vertices[id];
        self.span_text(vertex.start, vertex.end)
    }

    /// Characters `start..end` of the sentence.
    pub fn span_text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Ids of the vertices starting at character `position`.
    pub fn starting_at(&self, position: usize) -> &[usize] {
        &self.by_start[position]
    }

    /// Ids of the vertices an edge from `id` leads to.
    pub fn successors(&self, id: usize) -> &[usize] {
        if id == self.end {
            &[]
        } else {
            &self.by_start[self.vertices[id].end]
        }
    }

    /// Weight of the edge `from -> to`.
    pub fn cost(&self, from: usize, to: usize, bigram: Option<&BigramTable>) -> f64 {
        let from = &self.vertices[from];
        let to = &self.vertices[to];
        let frequency = from.frequency.max(1) as f64;
        let pair = bigram
            .map(|table| table.frequency(&from.key, &to.key))
            .unwrap_or(0) as f64;
        let probability = SMOOTHING * frequency / MAX_FREQUENCY
            + (1.0 - SMOOTHING) * ((1.0 - TEMP) * pair / frequency + TEMP);
        (-probability.ln()).abs()
    }

    /// The words of `path`, shifted by `offset` characters.
    pub fn words(&self, path: &[usize], offset: usize) -> Vec<Word> {
        path.iter()
            .map(|&id| &self.vertices[id])
            .filter(|v| !matches!(v.source, VertexSource::Begin | VertexSource::End))
            .map(|v| Word {
                start: v.start + offset,
                end: v.end + offset,
                nature: v.nature.clone(),
            })
            .collect()
    }
}

fn frequency_of(lexicon: &Lexicon, key: &str) -> u32 {
    lexicon
        .get(key)
        .map(|entry| entry.frequency)
        .unwrap_or(UNKNOWN_FREQUENCY)
}
