//! Momentum window analysis over per-over run totals.

use serde::Serialize;

use crate::model::OverSummary;

use super::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverRuns {
    pub over: u32,
    pub runs: u32,
}

/// Highest-scoring span of `K` consecutive overs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerplayWindow {
    pub start_over: u32,
    pub end_over: u32,
    pub total_runs: u32,
    pub overs: Vec<OverRuns>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunRatePoint {
    pub over: u32,
    pub run_rate: f64,
}

/// Prefix sums over an innings' over summaries.
///
/// `runs[i]` and `wickets[i]` hold the totals of the first `i` overs, so any
/// contiguous span is answered with one subtraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverPrefix {
    over_numbers: Vec<u32>,
    runs: Vec<u32>,
    wickets: Vec<u32>,
}

impl OverPrefix {
    pub fn new(overs: &[OverSummary]) -> Self {
        let mut runs = Vec::with_capacity(overs.len() + 1);
        let mut wickets = Vec::with_capacity(overs.len() + 1);
        runs.push(0);
        wickets.push(0);
        for o in overs {
            runs.push(runs[runs.len() - 1] + o.runs);
            wickets.push(wickets[wickets.len() - 1] + o.wickets);
        }
        OverPrefix {
            over_numbers: overs.iter().map(|o| o.over).collect(),
            runs,
            wickets,
        }
    }

    pub fn len(&self) -> usize {
        self.over_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.over_numbers.is_empty()
    }

    /// Runs scored in summaries `from..to` (0-based, end exclusive).
    pub fn runs_between(&self, from: usize, to: usize) -> u32 {
        let to = to.min(self.len());
        let from = from.min(to);
        self.runs[to] - self.runs[from]
    }

    pub fn wickets_between(&self, from: usize, to: usize) -> u32 {
        let to = to.min(self.len());
        let from = from.min(to);
        self.wickets[to] - self.wickets[from]
    }
}

/// The window of `k` consecutive overs with the highest run total, earliest
/// on ties. `None` when the innings has fewer than `k` overs or `k` is 0.
pub fn best_window(overs: &[OverSummary], k: usize) -> Option<PowerplayWindow> {
    if k == 0 || overs.len() < k {
        return None;
    }
    let prefix = OverPrefix::new(overs);
    let mut best_start = 0;
    let mut best_total = prefix.runs_between(0, k);
    for start in 1..=overs.len() - k {
        let total = prefix.runs_between(start, start + k);
        if total > best_total {
            best_start = start;
            best_total = total;
        }
    }
    let span = &overs[best_start..best_start + k];
    Some(PowerplayWindow {
        start_over: span[0].over,
        end_over: span[k - 1].over,
        total_runs: best_total,
        overs: span
            .iter()
            .map(|o| OverRuns {
                over: o.over,
                runs: o.runs,
            })
            .collect(),
    })
}

/// Trailing `k`-over run rate, one point per over from the `k`-th onward.
pub fn rolling_run_rate(overs: &[OverSummary], k: usize) -> Vec<RunRatePoint> {
    if k == 0 || overs.len() < k {
        return Vec::new();
    }
    let prefix = OverPrefix::new(overs);
    (k - 1..overs.len())
        .map(|i| RunRatePoint {
            over: overs[i].over,
            run_rate: round_to(prefix.runs_between(i + 1 - k, i + 1) as f64 / k as f64, 2),
        })
        .collect()
}
