//! Case-insensitive prefix search over player names.
//!
//! A trie keyed on lowercase characters. Each terminal node keeps the
//! original spellings that end there. Results come back in alphabetical
//! order of the lowercased name (children live in a `BTreeMap`), which is
//! stable regardless of insertion order.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    names: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NameTrie {
    root: TrieNode,
    len: usize,
}

impl NameTrie {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = NameTrie::default();
        for name in names {
            trie.insert(name.as_ref());
        }
        trie
    }

    /// Insert a name; exact duplicates are ignored.
    pub fn insert(&mut self, name: &str) {
        let mut node = &mut self.root;
        for ch in name.chars().flat_map(char::to_lowercase) {
            node = node.children.entry(ch).or_default();
        }
        if !node.names.iter().any(|n| n == name) {
            node.names.push(name.to_string());
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All names starting with `prefix`, ignoring case. The empty prefix
    /// matches everything.
    pub fn search(&self, prefix: &str) -> Vec<String> {
        let mut node = &self.root;
        for ch in prefix.chars().flat_map(char::to_lowercase) {
            match node.children.get(&ch) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }
        let mut out = Vec::new();
        collect(node, &mut out);
        out
    }
}

fn collect(node: &TrieNode, out: &mut Vec<String>) {
    out.extend(node.names.iter().cloned());
    for child in node.children.values() {
        collect(child, out);
    }
}
