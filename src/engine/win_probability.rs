//! Over-by-over win probability for a run chase.
//!
//! The model compares the runs the chasing side can be expected to make with
//! the balls and wickets it has left against the runs it still needs.
//!
//! ```text
//! overs_left  = balls_left / 6
//! resources   = 0.55 + 0.045 × wickets_in_hand       (1.0 with all ten)
//! expected    = max(par_run_rate, 1) × resources × overs_left
//! z           = (expected − runs_needed) / (SIGMA × √overs_left)
//! P(chase)    = sigmoid(LOGIT_SCALE × z)
//! ```
//!
//! `z` falls strictly as runs needed rise (balls and wickets fixed) and rises
//! strictly with wickets in hand, so the probability keeps both orderings.
//! Terminal states short-circuit: target reached → 1, no balls or no wickets
//! left → 0. The defending side gets the complement.

use serde::Serialize;

use crate::model::MatchModel;

use super::round_to;

/// Standard deviation of runs scored per over, from T20 ball-by-ball data.
const SIGMA: f64 = 5.5;
/// Maps a standard-normal `z` onto the logistic curve (probit ≈ logit).
const LOGIT_SCALE: f64 = 1.702;
/// Scoring resources with no wickets in hand (before the per-wicket term).
const BASE_RESOURCES: f64 = 0.55;
/// Scoring resources each wicket in hand adds.
const RESOURCES_PER_WICKET: f64 = 0.045;
/// Floor on the par rate. A first innings with no runs still leaves the
/// chase a positive expectation, so wickets in hand keep their weight.
const MIN_PAR_RUN_RATE: f64 = 1.0;
const MAX_WICKETS: u32 = 10;
const BALLS_PER_OVER: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinProbabilityPoint {
    pub over: u32,
    #[serde(rename = "teamBScore")]
    pub team_b_score: u32,
    #[serde(rename = "teamBWickets")]
    pub team_b_wickets: u32,
    #[serde(rename = "teamAWinProb")]
    pub team_a_win_prob: f64,
    #[serde(rename = "teamBWinProb")]
    pub team_b_win_prob: f64,
}

// ── Model ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseModel {
    /// Runs per over a side with all wickets in hand is expected to score
    pub par_run_rate: f64,
}

impl ChaseModel {
    pub fn new(par_run_rate: f64) -> Self {
        ChaseModel { par_run_rate }
    }

    /// Probability in [0, 1] that the chasing side wins.
    pub fn chase_probability(&self, runs_needed: i64, balls_left: u32, wickets_in_hand: u32) -> f64 {
        if runs_needed <= 0 {
            return 1.0;
        }
        if balls_left == 0 || wickets_in_hand == 0 {
            return 0.0;
        }
        let overs_left = balls_left as f64 / BALLS_PER_OVER as f64;
        let wickets = wickets_in_hand.min(MAX_WICKETS) as f64;
        let resources = BASE_RESOURCES + RESOURCES_PER_WICKET * wickets;
        let expected = self.par_run_rate.max(MIN_PAR_RUN_RATE) * resources * overs_left;
        let z = (expected - runs_needed as f64) / (SIGMA * overs_left.sqrt());
        sigmoid(LOGIT_SCALE * z)
    }
}

// ── Series ───────────────────────────────────────────────────────────────────

/// One point per over of the chase, including a final partial over.
pub fn win_probability_series(model: &MatchModel, chase: &ChaseModel) -> Vec<WinProbabilityPoint> {
    let target = model.target() as i64;
    let total_balls = model.total_overs * BALLS_PER_OVER;
    let innings = &model.innings.team_b;

    let mut score = 0u32;
    let mut wickets = 0u32;
    let mut balls = 0u32;
    innings
        .overs
        .iter()
        .map(|o| {
            score += o.runs;
            wickets += o.wickets;
            balls += o.legal_balls;
            let p = chase.chase_probability(
                target - score as i64,
                total_balls.saturating_sub(balls),
                MAX_WICKETS.saturating_sub(wickets),
            );
            let team_b = round_to(100.0 * p, 2);
            WinProbabilityPoint {
                over: o.over,
                team_b_score: score,
                team_b_wickets: wickets,
                team_a_win_prob: round_to(100.0 - team_b, 2),
                team_b_win_prob: team_b,
            }
        })
        .collect()
}

// ── Math utilities ───────────────────────────────────────────────────────────

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ── Tests ────────────────────────────────────────────────────────────────────
