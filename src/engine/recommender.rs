//! Next-bowler recommendation.
//!
//! Available bowlers (overs left under the cap, and a defined economy) sit in
//! a max-heap ordered by economy ascending, then wickets descending, then
//! overs left descending, then name. Peeking never changes the queue; only
//! [`BowlerRecommender::record_over`] does.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::model::{BowlingRecord, PlayerId};

use super::round_to;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: PlayerId,
    pub economy: f64,
    pub wickets: u32,
    pub overs_left: u32,
}

#[derive(Debug, Clone)]
struct BowlerState {
    name: PlayerId,
    runs: u32,
    legal_deliveries: u32,
    wickets: u32,
    overs_used: u32,
}

impl BowlerState {
    fn economy(&self) -> Option<f64> {
        (self.legal_deliveries > 0).then(|| self.runs as f64 * 6.0 / self.legal_deliveries as f64)
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    name: PlayerId,
    economy: f64,
    wickets: u32,
    overs_left: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .economy
            .total_cmp(&self.economy)
            .then(self.wickets.cmp(&other.wickets))
            .then(self.overs_left.cmp(&other.overs_left))
            .then(other.name.cmp(&self.name))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

#[derive(Debug, Clone)]
pub struct BowlerRecommender {
    cap: u32,
    bowlers: Vec<BowlerState>,
    queue: BinaryHeap<Candidate>,
}

impl BowlerRecommender {
    pub fn new(bowling: &[BowlingRecord], cap: u32) -> Self {
        let bowlers = bowling
            .iter()
            .map(|b| BowlerState {
                name: b.player.clone(),
                runs: b.runs_conceded,
                legal_deliveries: b.legal_deliveries,
                wickets: b.wickets,
                overs_used: b.overs_used(),
            })
            .collect();
        let mut rec = BowlerRecommender {
            cap,
            bowlers,
            queue: BinaryHeap::new(),
        };
        rec.rebuild();
        rec
    }

    fn rebuild(&mut self) {
        let cap = self.cap;
        self.queue = self
            .bowlers
            .iter()
            .filter_map(|b| {
                let overs_left = cap.saturating_sub(b.overs_used);
                let economy = b.economy()?;
                (overs_left > 0).then(|| Candidate {
                    name: b.name.clone(),
                    economy,
                    wickets: b.wickets,
                    overs_left,
                })
            })
            .collect();
    }

    /// Number of bowlers still available.
    pub fn available(&self) -> usize {
        self.queue.len()
    }

    pub fn recommend_next(&self) -> Option<Recommendation> {
        self.queue.peek().map(|c| Recommendation {
            name: c.name.clone(),
            economy: round_to(c.economy, 2),
            wickets: c.wickets,
            overs_left: c.overs_left,
        })
    }

    /// Record a completed six-ball over for `bowler` and re-rank. A bowler
    /// who reaches the cap leaves the queue.
    pub fn record_over(&mut self, bowler: &str, runs: u32, wickets: u32) {
        let idx = match self.bowlers.iter().position(|b| b.name == bowler) {
            Some(idx) => idx,
            None => {
                self.bowlers.push(BowlerState {
                    name: bowler.to_string(),
                    runs: 0,
                    legal_deliveries: 0,
                    wickets: 0,
                    overs_used: 0,
                });
                self.bowlers.len() - 1
            }
        };
        let state = &mut self.bowlers[idx];
        state.runs += runs;
        state.legal_deliveries += 6;
        state.wickets += wickets;
        state.overs_used += 1;
        self.rebuild();
    }
}
