//! Ordered index of batters by runs scored.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{BattingRecord, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunsEntry {
    pub player: PlayerId,
    pub runs: u32,
}

/// Balanced-tree index keyed by runs; batters sharing a score keep their
/// batting order. Built once and queried at any threshold.
#[derive(Debug, Clone, Default)]
pub struct RunsRangeIndex {
    tree: BTreeMap<u32, Vec<PlayerId>>,
}

impl RunsRangeIndex {
    pub fn new(batting: &[BattingRecord]) -> Self {
        let mut tree: BTreeMap<u32, Vec<PlayerId>> = BTreeMap::new();
        for rec in batting {
            tree.entry(rec.runs).or_default().push(rec.player.clone());
        }
        RunsRangeIndex { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Every batter with `runs >= threshold`, highest first.
    pub fn at_least(&self, threshold: u32) -> Vec<RunsEntry> {
        self.tree
            .range(threshold..)
            .rev()
            .flat_map(|(&runs, players)| {
                players.iter().map(move |p| RunsEntry {
                    player: p.clone(),
                    runs,
                })
            })
            .collect()
    }

    /// In-order traversal, lowest score first.
    pub fn ascending(&self) -> Vec<RunsEntry> {
        self.tree
            .iter()
            .flat_map(|(&runs, players)| {
                players.iter().map(move |p| RunsEntry {
                    player: p.clone(),
                    runs,
                })
            })
            .collect()
    }
}
