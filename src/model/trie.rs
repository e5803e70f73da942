//! Character trie used by the dictionaries.

use ahash::AHashMap;

#[derive(Clone, Debug, Default)]
struct TrieNode {
    children: AHashMap<char, u32>,
    value: Option<u32>,
}

/// A trie over `char`s mapping words to `u32` values.
///
/// # Examples
///
/// ```
/// use hanseg::model::Trie;
///
/// let mut trie = Trie::new();
/// trie.insert("中国", 0);
/// trie.insert("中国人", 1);
///
/// let chars: Vec<char> = "中国人民".chars().collect();
/// let found: Vec<_> = trie.prefixes(&chars).collect();
/// assert_eq!(found, vec![(2, 0), (3, 1)]);
/// ```
#[derive(Clone, Debug)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    len: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create an empty trie.
    pub fn new() -> Self {
        Trie {
            nodes: vec![TrieNode::default()],
            len: 0,
        }
    }

    /// Insert `key`, returning the value it replaced.
    pub fn insert(&mut self, key: &str, value: u32) -> Option<u32> {
        let mut node = 0usize;
        for ch in key.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(ch, next as u32);
                    next
                }
            };
        }
        let previous = self.nodes[node].value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Exact lookup.
    pub fn get(&self, key: &str) -> Option<u32> {
        let mut node = 0usize;
        for ch in key.chars() {
            node = *self.nodes[node].children.get(&ch)? as usize;
        }
        self.nodes[node].value
    }

    /// Every key that is a prefix of `chars`, as `(length in chars, value)`,
    /// shortest first.
    pub fn prefixes<'a>(&'a self, chars: &'a [char]) -> Prefixes<'a> {
        Prefixes {
            trie: self,
            chars,
            node: Some(0),
            consumed: 0,
        }
    }

    /// The longest key that is a prefix of `chars`.
    pub fn longest_prefix(&self, chars: &[char]) -> Option<(usize, u32)> {
        self.prefixes(chars).last()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trie has no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Iterator returned by [`Trie::prefixes`].
pub struct Prefixes<'a> {
    trie: &'a Trie,
    chars: &'a [char],
    node: Option<usize>,
    consumed: usize,
}

impl Iterator for Prefixes<'_> {
    type Item = (usize, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.node {
            if self.consumed >= self.chars.len() {
                self.node = None;
                return None;
            }
            let ch = self.chars[self.consumed];
            match self.trie.nodes[node].children.get(&ch) {
                Some(&next) => {
                    self.consumed += 1;
                    self.node = Some(next as usize);
                    if let Some(value) = self.trie.nodes[next as usize].value {
                        return Some((self.consumed, value));
                    }
                }
                None => self.node = None,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut trie = Trie::new();
        assert_eq!(trie.insert("人民", 7), None);
        assert_eq!(trie.insert("人民", 8), Some(7));

        assert_eq!(trie.get("人民"), Some(8));
        assert_eq!(trie.get("人"), None);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_longest_prefix() {
        let mut trie = Trie::new();
        trie.insert("共和", 0);
        trie.insert("共和国", 1);

        let chars: Vec<char> = "共和国家".chars().collect();
        assert_eq!(trie.longest_prefix(&chars), Some((3, 1)));

        let chars: Vec<char> = "和平".chars().collect();
        assert_eq!(trie.longest_prefix(&chars), None);
    }

    #[test]
    fn test_empty_input() {
        let mut trie = Trie::new();
        trie.insert("a", 0);
        assert_eq!(trie.prefixes(&[]).count(), 0);
    }
}
