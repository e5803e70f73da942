//! Word bigram frequencies (`left@right frequency` per line).

use ahash::AHashMap;

use crate::error::{HansegError, Result};

/// Marker word for the start of a sentence.
pub const BEGIN_WORD: &str = "始##始";
/// Marker word for the end of a sentence.
pub const END_WORD: &str = "末##末";

/// How often one word follows another.
#[derive(Clone, Debug, Default)]
pub struct BigramTable {
    table: AHashMap<String, AHashMap<String, u32>>,
    len: usize,
}

impl BigramTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the text format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = BigramTable::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (pair, frequency) = line
                .rsplit_once(char::is_whitespace)
                .ok_or_else(|| HansegError::parse(format!("line {}: missing frequency", line_no + 1)))?;
            let (left, right) = pair
                .trim()
                .split_once('@')
                .ok_or_else(|| HansegError::parse(format!("line {}: expected 'left@right'", line_no + 1)))?;
            let frequency = frequency.parse::<u32>().map_err(|_| {
                HansegError::parse(format!("line {}: invalid frequency '{frequency}'", line_no + 1))
            })?;
            table.insert(left, right, frequency);
        }
        Ok(table)
    }

    /// Record a bigram frequency.
    pub fn insert(&mut self, left: &str, right: &str, frequency: u32) {
        let previous = self
            .table
            .entry(left.to_string())
            .or_default()
            .insert(right.to_string(), frequency);
        if previous.is_none() {
            self.len += 1;
        }
    }

    /// Frequency of `right` following `left`, zero when unseen.
    pub fn frequency(&self, left: &str, right: &str) -> u32 {
        self.table
            .get(left)
            .and_then(|rights| rights.get(right))
            .copied()
            .unwrap_or(0)
    }

    /// Number of bigrams.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let table = BigramTable::parse("始##始@中国 50\n中国@人民 12\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.frequency(BEGIN_WORD, "中国"), 50);
        assert_eq!(table.frequency("中国", "人民"), 12);
        assert_eq!(table.frequency("人民", "中国"), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(BigramTable::parse("中国人民 12\n").is_err());
        assert!(BigramTable::parse("中国@人民 x\n").is_err());
        assert!(BigramTable::parse("中国@人民\n").is_err());
    }
}
