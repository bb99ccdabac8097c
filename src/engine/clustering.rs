//! Dismissal clustering with a disjoint-set forest.
//!
//! Clustering key: the bowler credited with the wicket. Every batter a given
//! bowler dismissed lands in one cluster labelled `"Dismissed by <bowler>"`;
//! all run-outs (no credited bowler) form a single `"Run out"` cluster.
//! Not-out batters never enter the structure.

use std::collections::HashMap;

use crate::model::{InningsSnapshot, PlayerId};

use super::OrderedMap;

/// Union-find with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        DisjointSet {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets holding `a` and `b`. Returns false if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

fn cluster_label(bowler: Option<&str>) -> String {
    match bowler {
        Some(b) => format!("Dismissed by {}", b),
        None => "Run out".to_string(),
    }
}

/// Cluster label → dismissed batters, clusters in order of first dismissal
/// and members in dismissal order.
pub fn batter_clusters(innings: &InningsSnapshot) -> OrderedMap<Vec<PlayerId>> {
    let dismissed = &innings.dismissals;
    let mut sets = DisjointSet::new(dismissed.len());
    let mut first_with_key: HashMap<Option<&str>, usize> = HashMap::new();
    for (i, d) in dismissed.iter().enumerate() {
        let key = d.bowler.as_deref();
        match first_with_key.get(&key) {
            Some(&j) => {
                sets.union(j, i);
            }
            None => {
                first_with_key.insert(key, i);
            }
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut members: Vec<(String, Vec<PlayerId>)> = Vec::new();
    for (i, d) in dismissed.iter().enumerate() {
        let root = sets.find(i);
        match roots.iter().position(|&r| r == root) {
            Some(pos) => members[pos].1.push(d.player_out.clone()),
            None => {
                roots.push(root);
                members.push((cluster_label(d.bowler.as_deref()), vec![d.player_out.clone()]));
            }
        }
    }
    OrderedMap(members)
}
