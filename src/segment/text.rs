//! Input text as a sequence of (optionally normalized) characters.

use std::ops::Range;

/// Characters that end a sentence.
const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '；', ';', '…', '\n', '\r'];

/// The characters of one input, with the byte offset of each in the
/// original text.
///
/// Normalization replaces characters one for one, so every character keeps
/// the byte span it had in the original text.
///
/// # Examples
///
/// ```
/// use hanseg::segment::text::CharSeq;
///
/// let seq = CharSeq::new("ＡＢ中文", true);
/// assert_eq!(seq.text(0, 2), "ab");
/// assert_eq!(seq.byte_range(2, 4), 6..12);
/// ```
#[derive(Clone, Debug)]
pub struct CharSeq {
    chars: Vec<char>,
    offsets: Vec<usize>,
}

impl CharSeq {
    /// Split `text` into characters, normalizing them if asked.
    pub fn new(text: &str, normalize: bool) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.char_indices() {
            offsets.push(offset);
            chars.push(if normalize { normalize_char(ch) } else { ch });
        }
        offsets.push(text.len());
        CharSeq { chars, offsets }
    }

    /// The characters.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether there are no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Byte range in the original text of characters `start..end`.
    pub fn byte_range(&self, start: usize, end: usize) -> Range<usize> {
        self.offsets[start]..self.offsets[end]
    }

    /// Characters `start..end` as a string.
    pub fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Sentence ranges (in characters); each includes its terminator.
    pub fn sentences(&self) -> Vec<Range<usize>> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for (i, ch) in self.chars.iter().enumerate() {
            if SENTENCE_TERMINATORS.contains(ch) {
                sentences.push(start..i + 1);
                start = i + 1;
            }
        }
        if start < self.chars.len() {
            sentences.push(start..self.chars.len());
        }
        sentences
    }
}

/// Fold a full-width form to half width and upper case to lower case.
///
/// Characters whose lower case is not a single character are kept.
pub fn normalize_char(ch: char) -> char {
    let ch = match ch {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
        _ => ch,
    };
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}
