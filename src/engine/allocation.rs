//! Bowling allocation optimizer.
//!
//! Distributes a quota of overs among bowlers, each capped, to minimize the
//! expected runs conceded. Expected runs for one over are the bowler's runs
//! per over, so cost is linear in overs given. The DP runs bowler by bowler:
//! `dp[i][j]` is the cheapest way to cover `j` overs with the first `i`
//! bowlers. This visits the same states as the (overs remaining, overs used
//! per bowler) recurrence, collapsed because per-over cost does not depend
//! on the order overs are bowled in.

use serde::Serialize;

use crate::error::{AnalyticsError, Result};
use crate::model::{BowlingRecord, PlayerId};

use super::round_to;

#[derive(Debug, Clone, PartialEq)]
pub struct BowlerRate {
    pub bowler: PlayerId,
    pub runs_per_over: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BowlerOvers {
    pub bowler: PlayerId,
    pub overs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub min_expected_runs: f64,
    pub allocation: Vec<BowlerOvers>,
}

impl AllocationPlan {
    pub fn total_overs(&self) -> u32 {
        self.allocation.iter().map(|a| a.overs).sum()
    }
}

const EPS: f64 = 1e-9;

/// Expected runs per over for every bowler, in scorecard order.
///
/// A bowler with no legal delivery has no economy of their own and is rated
/// at the most expensive observed economy, so they only take overs the
/// rated bowlers cannot cover. With no rated bowler at all there is nothing
/// to go on and the list is empty.
pub fn rates_from_bowling(bowling: &[BowlingRecord]) -> Vec<BowlerRate> {
    let worst = bowling
        .iter()
        .filter_map(BowlingRecord::economy)
        .fold(None, |acc: Option<f64>, e| Some(acc.map_or(e, |a| a.max(e))));
    let Some(worst) = worst else {
        return Vec::new();
    };
    bowling
        .iter()
        .map(|b| BowlerRate {
            bowler: b.player.clone(),
            runs_per_over: b.economy().unwrap_or(worst),
        })
        .collect()
}

/// Allocate `quota` overs, at most `cap` per bowler, minimizing expected runs.
pub fn optimize(rates: &[BowlerRate], quota: u32, cap: u32) -> Result<AllocationPlan> {
    let capacity = cap.saturating_mul(rates.len() as u32);
    if capacity < quota {
        return Err(AnalyticsError::AllocationInfeasible { quota, capacity });
    }
    let q = quota as usize;
    let n = rates.len();

    // dp[i][j]: min cost covering j overs with bowlers 0..i; choice[i][j]: overs given to bowler i-1
    let mut dp = vec![vec![f64::INFINITY; q + 1]; n + 1];
    let mut choice = vec![vec![0u32; q + 1]; n + 1];
    dp[0][0] = 0.0;

    for i in 1..=n {
        let rate = rates[i - 1].runs_per_over;
        for j in 0..=q {
            let mut best = f64::INFINITY;
            let mut best_k = 0;
            for k in 0..=(cap as usize).min(j) {
                let prev = dp[i - 1][j - k];
                if !prev.is_finite() {
                    continue;
                }
                let cost = prev + rate * k as f64;
                if cost < best - EPS {
                    best = cost;
                    best_k = k as u32;
                }
            }
            dp[i][j] = best;
            choice[i][j] = best_k;
        }
    }

    let mut overs = vec![0u32; n];
    let mut remaining = q;
    for i in (1..=n).rev() {
        let k = choice[i][remaining];
        overs[i - 1] = k;
        remaining -= k as usize;
    }

    Ok(AllocationPlan {
        min_expected_runs: round_to(dp[n][q], 1),
        allocation: rates
            .iter()
            .zip(overs)
            .map(|(r, overs)| BowlerOvers {
                bowler: r.bowler.clone(),
                overs,
            })
            .collect(),
    })
}
