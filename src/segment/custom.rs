//! Merging adjacent words into custom dictionary words.

use crate::model::Lexicon;
use crate::segment::Word;

/// Replace every run of two or more adjacent words that spells a custom
/// word by that word, preferring the longest match from the left.
///
/// `chars` are the characters the word positions refer to.
pub fn merge_custom(chars: &[char], words: Vec<Word>, custom: &Lexicon) -> Vec<Word> {
    if custom.is_empty() || words.len() < 2 {
        return words;
    }
    let mut merged = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let start = words[i].start;
        let mut best: Option<(usize, Option<String>)> = None;
        for (len, entry) in custom.prefixes(&chars[start..]) {
            let end = start + len;
            // Match must close on a word boundary after at least two words.
            let mut k = i + 1;
            while k < words.len() && words[k].end < end {
                k += 1;
            }
            if k < words.len() && words[k].end == end {
                best = Some((k, entry.nature().map(str::to_string)));
            }
        }
        match best {
            Some((last, nature)) if contiguous(&words[i..=last]) => {
                merged.push(Word {
                    start,
                    end: words[last].end,
                    nature,
                });
                i = last + 1;
            }
            _ => {
                merged.push(words[i].clone());
                i += 1;
            }
        }
    }
    merged
}

fn contiguous(words: &[Word]) -> bool {
    words.windows(2).all(|pair| pair[0].end == pair[1].start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(spans: &[(usize, usize)]) -> Vec<Word> {
        spans
            .iter()
            .map(|&(start, end)| Word {
                start,
                end,
                nature: None,
            })
            .collect()
    }

    fn spans(words: &[Word]) -> Vec<(usize, usize)> {
        words.iter().map(|w| (w.start, w.end)).collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let custom = Lexicon::parse_custom("攻城\n攻城狮\n").unwrap();
        let chars: Vec<char> = "攻城狮来了".chars().collect();
        let merged = merge_custom(&chars, words(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]), &custom);

        assert_eq!(spans(&merged), vec![(0, 3), (3, 4), (4, 5)]);
        assert_eq!(merged[0].nature.as_deref(), Some("nz"));
    }

    #[test]
    fn test_match_must_end_on_word_boundary() {
        let custom = Lexicon::parse_custom("城狮\n").unwrap();
        let chars: Vec<char> = "攻城狮".chars().collect();
        let merged = merge_custom(&chars, words(&[(0, 2), (2, 3)]), &custom);

        assert_eq!(spans(&merged), vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn test_single_word_is_kept() {
        let custom = Lexicon::parse_custom("攻城狮 n 5\n").unwrap();
        let chars: Vec<char> = "攻城狮".chars().collect();
        let merged = merge_custom(&chars, words(&[(0, 3)]), &custom);

        assert_eq!(spans(&merged), vec![(0, 3)]);
        assert_eq!(merged[0].nature, None);
    }
}
