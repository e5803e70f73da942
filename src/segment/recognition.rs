//! Place and organization name recognition on a coarse path.
//!
//! A name is a short run of noun-like or unknown words closed by a suffix
//! word such as `市` or `大学` (or `University` for capitalized Latin
//! names). Recognized names are added to the lattice as extra vertices and
//! the path search runs again, so a name only survives when it makes the
//! whole sentence cheaper.

use crate::segment::atom::{AtomKind, is_cjk};
use crate::segment::word_net::{ORGANIZATION_TAG, PLACE_TAG, Vertex, VertexSource, WordNet};

/// Words closing a place name.
pub const PLACE_SUFFIXES: &[&str] = &[
    "省", "市", "县", "区", "镇", "乡", "村", "州", "旗", "街道", "路", "街", "港", "湾",
];

/// Words closing an organization name.
pub const ORGANIZATION_SUFFIXES: &[&str] = &[
    "公司", "大学", "学院", "银行", "集团", "协会", "委员会", "研究院", "研究所", "医院", "中学",
    "小学", "出版社", "基金会",
];

/// Latin words closing an organization name.
pub const LATIN_ORGANIZATION_SUFFIXES: &[&str] = &[
    "University", "College", "Institute", "Company", "Corporation", "Bank", "Inc", "Group",
    "Association",
];

/// Frequency given to recognized names.
pub const ENTITY_FREQUENCY: u32 = 1000;

const MAX_PLACE_PREFIX_WORDS: usize = 2;
const MAX_PLACE_PREFIX_CHARS: usize = 3;
const MAX_ORGANIZATION_PREFIX_WORDS: usize = 3;
const MAX_ORGANIZATION_PREFIX_CHARS: usize = 8;
const MAX_LATIN_PREFIX_WORDS: usize = 3;

/// The kind of a recognized name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// Place name.
    Place,
    /// Organization name.
    Organization,
}

impl EntityKind {
    /// Part of speech of the name.
    pub fn nature(&self) -> &'static str {
        match self {
            EntityKind::Place => "ns",
            EntityKind::Organization => "nt",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            EntityKind::Place => PLACE_TAG,
            EntityKind::Organization => ORGANIZATION_TAG,
        }
    }
}

/// A recognized name spanning characters `start..end` of the sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    /// First character.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
    /// Kind of name.
    pub kind: EntityKind,
}

impl Entity {
    /// The lattice vertex for this name.
    pub fn vertex(&self) -> Vertex {
        Vertex {
            start: self.start,
            end: self.end,
            key: self.kind.tag().to_string(),
            nature: Some(self.kind.nature().to_string()),
            frequency: ENTITY_FREQUENCY,
            source: VertexSource::Entity,
        }
    }
}

/// Suffix-rule recognizer for places and organizations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Recognizer {
    place: bool,
    organization: bool,
}

impl Recognizer {
    /// Create a recognizer with the given rules enabled.
    pub fn new(place: bool, organization: bool) -> Self {
        Recognizer {
            place,
            organization,
        }
    }

    /// Whether any rule is enabled.
    pub fn is_enabled(&self) -> bool {
        self.place || self.organization
    }

    /// Names found on `path` (vertex ids of `net`).
    pub fn recognize(&self, net: &WordNet<'_>, path: &[usize]) -> Vec<Entity> {
        let mut entities = Vec::new();
        for (index, &id) in path.iter().enumerate() {
            let text = net.text(id);
            let vertex = net.vertex(id);
            if self.place && PLACE_SUFFIXES.contains(&text.as_str()) {
                if let Some(start) = cjk_prefix(
                    net,
                    &path[..index],
                    MAX_PLACE_PREFIX_WORDS,
                    MAX_PLACE_PREFIX_CHARS,
                ) {
                    entities.push(Entity {
                        start,
                        end: vertex.end,
                        kind: EntityKind::Place,
                    });
                }
            }
            if self.organization {
                let start = if ORGANIZATION_SUFFIXES.contains(&text.as_str()) {
                    cjk_prefix(
                        net,
                        &path[..index],
                        MAX_ORGANIZATION_PREFIX_WORDS,
                        MAX_ORGANIZATION_PREFIX_CHARS,
                    )
                } else if LATIN_ORGANIZATION_SUFFIXES.contains(&text.as_str()) {
                    latin_prefix(net, &path[..index])
                } else {
                    None
                };
                if let Some(start) = start {
                    entities.push(Entity {
                        start,
                        end: vertex.end,
                        kind: EntityKind::Organization,
                    });
                }
            }
        }
        entities
    }
}

/// Start of the longest run of qualifying words right before the suffix.
fn cjk_prefix(
    net: &WordNet<'_>,
    before: &[usize],
    max_words: usize,
    max_chars: usize,
) -> Option<usize> {
    let mut start = None;
    let mut chars = 0;
    for &id in before.iter().rev().take(max_words) {
        let vertex = net.vertex(id);
        chars += vertex.end - vertex.start;
        if chars > max_chars || !qualifies(net, id) {
            break;
        }
        start = Some(vertex.start);
    }
    start
}

fn qualifies(net: &WordNet<'_>, id: usize) -> bool {
    let vertex = net.vertex(id);
    if matches!(vertex.source, VertexSource::Begin | VertexSource::End) {
        return false;
    }
    let nature_ok = match vertex.nature.as_deref() {
        None => true,
        Some(nature) => nature.starts_with('n') || nature == "j",
    };
    nature_ok && net.text(id).chars().all(is_cjk)
}

/// Start of the capitalized words, separated by single spaces, before a
/// Latin suffix.
fn latin_prefix(net: &WordNet<'_>, before: &[usize]) -> Option<usize> {
    let mut start = None;
    let mut rest = before;
    for _ in 0..MAX_LATIN_PREFIX_WORDS {
        let [head @ .., word, space] = rest else { break };
        if net.text(*space) != " " || !capitalized_latin(net, *word) {
            break;
        }
        start = Some(net.vertex(*word).start);
        rest = head;
    }
    start
}

fn capitalized_latin(net: &WordNet<'_>, id: usize) -> bool {
    let text = net.text(id);
    let latin = matches!(net.vertex(id).source, VertexSource::Atom(AtomKind::Latin))
        || text.chars().all(|c| c.is_ascii_alphabetic());
    latin && text.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lexicon;
    use crate::segment::path::viterbi;

    fn names(net: &WordNet<'_>, entities: &[Entity]) -> Vec<(String, &'static str)> {
        entities
            .iter()
            .map(|e| (net.span_text(e.start, e.end), e.kind.nature()))
            .collect()
    }

    #[test]
    fn test_place_from_unknown_characters() {
        let core = Lexicon::parse_core("我 r 100\n在 p 100\n区 n 50\n").unwrap();
        let chars: Vec<char> = "我在海淀区".chars().collect();
        let net = WordNet::build(&chars, &core, None);
        let path = viterbi(&net, None);

        let entities = Recognizer::new(true, false).recognize(&net, &path);
        assert_eq!(names(&net, &entities), vec![("海淀区".to_string(), "ns")]);
    }

    #[test]
    fn test_organization_prefix_limit() {
        let core = Lexicon::parse_core("中国 ns 100\n人民 n 100\n银行 n 100\n").unwrap();
        let chars: Vec<char> = "中国人民银行".chars().collect();
        let net = WordNet::build(&chars, &core, None);
        let path = viterbi(&net, None);

        let entities = Recognizer::new(false, true).recognize(&net, &path);
        assert_eq!(names(&net, &entities), vec![("中国人民银行".to_string(), "nt")]);
        assert!(Recognizer::new(true, false).recognize(&net, &path).is_empty());
    }

    #[test]
    fn test_latin_organization() {
        let core = Lexicon::new();
        let chars: Vec<char> = "at New York University".chars().collect();
        let net = WordNet::build(&chars, &core, None);
        let path = viterbi(&net, None);

        let entities = Recognizer::new(false, true).recognize(&net, &path);
        assert_eq!(
            names(&net, &entities),
            vec![("New York University".to_string(), "nt")]
        );
    }

    #[test]
    fn test_disabled() {
        let recognizer = Recognizer::default();
        assert!(!recognizer.is_enabled());
    }
}
