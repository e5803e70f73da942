//! Atomic units no segmentation may split.
//!
//! Each CJK character and each punctuation character is an atom on its
//! own. Runs of Latin letters, runs of digits (with an inner decimal point)
//! and runs of whitespace form one atom each.

use serde::{Deserialize, Serialize};

/// The class of an atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomKind {
    /// One CJK ideograph.
    Cjk,
    /// A run of letters outside the CJK blocks.
    Latin,
    /// A run of digits.
    Digit,
    /// A run of whitespace.
    Whitespace,
    /// One punctuation or symbol character.
    Punctuation,
}

impl AtomKind {
    /// Nature given to atoms the dictionaries do not know.
    pub fn nature(&self) -> Option<&'static str> {
        match self {
            AtomKind::Cjk => None,
            AtomKind::Latin => Some("nx"),
            AtomKind::Digit => Some("m"),
            AtomKind::Whitespace | AtomKind::Punctuation => Some("w"),
        }
    }
}

/// Characters `start..end` forming one atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Atom {
    /// First character.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
    /// Atom class.
    pub kind: AtomKind,
}

impl Atom {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the atom is empty (never true for produced atoms).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Whether `ch` is a CJK ideograph.
pub fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '〇')
}

/// Class of a single character.
pub fn char_kind(ch: char) -> AtomKind {
    if is_cjk(ch) {
        AtomKind::Cjk
    } else if ch.is_whitespace() {
        AtomKind::Whitespace
    } else if ch.is_ascii_digit() {
        AtomKind::Digit
    } else if ch.is_alphabetic() {
        AtomKind::Latin
    } else {
        AtomKind::Punctuation
    }
}

/// Split `chars` into atoms.
///
/// # Examples
///
/// ```
/// use hanseg::segment::atom::{AtomKind, atoms};
///
/// let chars: Vec<char> = "买了3.5斤apple".chars().collect();
/// let kinds: Vec<_> = atoms(&chars).iter().map(|a| (a.len(), a.kind)).collect();
/// assert_eq!(kinds, vec![
///     (1, AtomKind::Cjk),
///     (1, AtomKind::Cjk),
///     (3, AtomKind::Digit),
///     (1, AtomKind::Cjk),
///     (5, AtomKind::Latin),
/// ]);
/// ```
pub fn atoms(chars: &[char]) -> Vec<Atom> {
    let mut atoms = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let kind = char_kind(chars[i]);
        let start = i;
        i += 1;
        match kind {
            AtomKind::Latin | AtomKind::Whitespace => {
                while i < chars.len() && char_kind(chars[i]) == kind {
                    i += 1;
                }
            }
            AtomKind::Digit => {
                while i < chars.len() {
                    let continues = char_kind(chars[i]) == AtomKind::Digit
                        || (chars[i] == '.'
                            && i + 1 < chars.len()
                            && char_kind(chars[i + 1]) == AtomKind::Digit);
                    if !continues {
                        break;
                    }
                    i += 1;
                }
            }
            AtomKind::Cjk | AtomKind::Punctuation => {}
        }
        atoms.push(Atom {
            start,
            end: i,
            kind,
        });
    }
    atoms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_kind() {
        assert_eq!(char_kind('中'), AtomKind::Cjk);
        assert_eq!(char_kind('x'), AtomKind::Latin);
        assert_eq!(char_kind('é'), AtomKind::Latin);
        assert_eq!(char_kind('7'), AtomKind::Digit);
        assert_eq!(char_kind('，'), AtomKind::Punctuation);
        assert_eq!(char_kind('\u{3000}'), AtomKind::Whitespace);
    }

    #[test]
    fn test_latin_words_and_spaces() {
        let chars: Vec<char> = "New  York".chars().collect();
        let spans: Vec<_> = atoms(&chars).iter().map(|a| (a.start, a.end)).collect();
        assert_eq!(spans, vec![(0, 3), (3, 5), (5, 9)]);
    }

    #[test]
    fn test_trailing_dot_is_not_decimal() {
        let chars: Vec<char> = "12.".chars().collect();
        let kinds: Vec<_> = atoms(&chars).iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AtomKind::Digit, AtomKind::Punctuation]);
    }
}
