//! Match report: every named query result for both teams, plus the memoising
//! engine the HTTP layer reads through.

pub mod cache;
pub mod query;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::allocation::AllocationPlan;
use crate::engine::leaderboard::{BattingEntry, BattingSort, BowlingEntry, BowlingSort};
use crate::engine::matchup::{Assignment, BowlerCentrality, MatchupLine, MatchupPick};
use crate::engine::momentum::{PowerplayWindow, RunRatePoint};
use crate::engine::patterns::DuplicateOvers;
use crate::engine::range_index::RunsEntry;
use crate::engine::recommender::Recommendation;
use crate::engine::win_probability::WinProbabilityPoint;
use crate::engine::{round_to, OrderedMap};
use crate::model::{ExtrasTally, MatchModel, Partnership, PlayerId, Team, TeamOptional, TeamPair};

pub use cache::{AnalyticsEngine, QueryCache, QueryKey};
pub use query::{run_query, QueryKind, QueryParams, TeamView};

/// Engine knobs, independent of how they were configured.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub max_overs_per_bowler: u32,
    pub powerplay_overs: usize,
    pub run_thresholds: Vec<u32>,
    pub search_prefixes: Vec<String>,
    pub par_run_rate: Option<f64>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            max_overs_per_bowler: 4,
            powerplay_overs: 6,
            run_thresholds: vec![30, 50],
            search_prefixes: vec!["sh".into(), "mo".into(), "ab".into()],
            par_run_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InningsSummary {
    pub team: String,
    pub score: u32,
    pub wickets: u32,
    pub overs: String,
    pub run_rate: Option<f64>,
    pub extras: ExtrasTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverLine {
    pub runs: u32,
    pub wickets: u32,
}

/// Both sides' returns from the same over number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OversComparison {
    pub over: u32,
    #[serde(flatten)]
    pub sides: TeamOptional<OverLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingBoards {
    pub by_runs: Vec<BattingEntry>,
    pub by_strike_rate: Vec<BattingEntry>,
    pub by_fours: Vec<BattingEntry>,
    pub by_sixes: Vec<BattingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlingBoards {
    pub by_wickets: Vec<BowlingEntry>,
    pub by_runs: Vec<BowlingEntry>,
    pub by_economy: Vec<BowlingEntry>,
}

/// The full set of named query results. Team-keyed results that are absent
/// for a side omit that side's key; whole-match results that are absent omit
/// the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub generated_at: DateTime<Utc>,
    pub teams: TeamPair<String>,
    pub target: u32,
    pub innings: TeamPair<InningsSummary>,

    pub batting_leaderboard: TeamPair<Vec<BattingEntry>>,
    pub bowling_leaderboard: TeamPair<Vec<BowlingEntry>>,
    pub weakest_bowler_matchups: TeamPair<OrderedMap<MatchupPick>>,
    pub strongest_bowler_matchups: TeamPair<OrderedMap<MatchupPick>>,
    pub bowler_centrality: TeamPair<OrderedMap<BowlerCentrality>>,
    pub optimal_assignment: TeamPair<Vec<Assignment>>,
    pub best_powerplay: TeamOptional<PowerplayWindow>,
    pub rolling_run_rate: TeamPair<Vec<RunRatePoint>>,
    /// `batters_above_<threshold>` for each configured threshold
    #[serde(flatten)]
    pub batters_above: BTreeMap<String, TeamPair<Vec<RunsEntry>>>,
    pub player_search: TeamPair<OrderedMap<Vec<PlayerId>>>,
    pub optimal_bowling_allocation: TeamOptional<AllocationPlan>,
    pub scoring_patterns: TeamPair<OrderedMap<u32>>,
    pub duplicate_overs: TeamPair<Vec<DuplicateOvers>>,
    pub batter_clusters: TeamPair<OrderedMap<Vec<PlayerId>>>,
    pub next_bowler_recommendation: TeamOptional<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_probability: Option<Vec<WinProbabilityPoint>>,

    pub batting_sorted: TeamPair<BattingBoards>,
    pub bowling_sorted: TeamPair<BowlingBoards>,
    pub overs_comparison: Vec<OversComparison>,
    pub batter_vs_bowler: TeamPair<OrderedMap<Vec<MatchupLine>>>,
    pub partnerships: TeamPair<Vec<Partnership>>,
    pub similar_overs: TeamPair<OrderedMap<Vec<u32>>>,
    pub recurring_sequences: TeamPair<OrderedMap<u32>>,
}

impl MatchReport {
    pub fn build(model: &MatchModel, settings: &AnalysisSettings) -> Self {
        let view = |team| TeamView::new(model, settings, team);

        let best_powerplay = TeamOptional::from_fn(|team| {
            let window = view(team).best_powerplay();
            if window.is_none() {
                warn!(
                    "best_powerplay omitted for {}: fewer than {} overs",
                    team.key(),
                    settings.powerplay_overs
                );
            }
            window
        });
        let optimal_bowling_allocation = TeamOptional::from_fn(|team| match view(team).optimal_bowling_allocation() {
            Ok(plan) => Some(plan),
            Err(e) => {
                warn!("optimal_bowling_allocation omitted for {}: {}", team.key(), e);
                None
            }
        });
        let next_bowler_recommendation = TeamOptional::from_fn(|team| {
            let rec = view(team).next_bowler_recommendation();
            if rec.is_none() {
                warn!("next_bowler_recommendation omitted for {}: no bowler available", team.key());
            }
            rec
        });
        let win_probability = query::win_probability(model, settings);
        if win_probability.is_none() {
            warn!("win_probability omitted: no par run rate available");
        }

        let batters_above = settings
            .run_thresholds
            .iter()
            .map(|&t| {
                (
                    format!("batters_above_{}", t),
                    TeamPair::from_fn(|team| view(team).batters_above(t)),
                )
            })
            .collect();

        let report = MatchReport {
            generated_at: Utc::now(),
            teams: model.teams.clone(),
            target: model.target(),
            innings: TeamPair::from_fn(|team| innings_summary(model, team)),
            batting_leaderboard: TeamPair::from_fn(|t| view(t).batting_leaderboard(BattingSort::Runs)),
            bowling_leaderboard: TeamPair::from_fn(|t| view(t).bowling_leaderboard(BowlingSort::Wickets)),
            weakest_bowler_matchups: TeamPair::from_fn(|t| view(t).weakest_bowler_matchups()),
            strongest_bowler_matchups: TeamPair::from_fn(|t| view(t).strongest_bowler_matchups()),
            bowler_centrality: TeamPair::from_fn(|t| view(t).bowler_centrality()),
            optimal_assignment: TeamPair::from_fn(|t| view(t).optimal_assignment()),
            best_powerplay,
            rolling_run_rate: TeamPair::from_fn(|t| view(t).rolling_run_rate()),
            batters_above,
            player_search: TeamPair::from_fn(|t| view(t).player_search()),
            optimal_bowling_allocation,
            scoring_patterns: TeamPair::from_fn(|t| view(t).scoring_patterns()),
            duplicate_overs: TeamPair::from_fn(|t| view(t).duplicate_overs()),
            batter_clusters: TeamPair::from_fn(|t| view(t).batter_clusters()),
            next_bowler_recommendation,
            win_probability,
            batting_sorted: TeamPair::from_fn(|t| {
                let v = view(t);
                BattingBoards {
                    by_runs: v.batting_leaderboard(BattingSort::Runs),
                    by_strike_rate: v.batting_leaderboard(BattingSort::StrikeRate),
                    by_fours: v.batting_leaderboard(BattingSort::Fours),
                    by_sixes: v.batting_leaderboard(BattingSort::Sixes),
                }
            }),
            bowling_sorted: TeamPair::from_fn(|t| {
                let v = view(t);
                BowlingBoards {
                    by_wickets: v.bowling_leaderboard(BowlingSort::Wickets),
                    by_runs: v.bowling_leaderboard(BowlingSort::Runs),
                    by_economy: v.bowling_leaderboard(BowlingSort::Economy),
                }
            }),
            overs_comparison: overs_comparison(model),
            batter_vs_bowler: TeamPair::from_fn(|t| view(t).batter_vs_bowler()),
            partnerships: TeamPair::from_fn(|t| view(t).partnerships().to_vec()),
            similar_overs: TeamPair::from_fn(|t| view(t).similar_overs()),
            recurring_sequences: TeamPair::from_fn(|t| view(t).recurring_sequences()),
        };
        info!(
            "Report built: {} {}/{} vs {} {}/{}",
            report.teams.team_a,
            report.innings.team_a.score,
            report.innings.team_a.wickets,
            report.teams.team_b,
            report.innings.team_b.score,
            report.innings.team_b.wickets
        );
        report
    }
}

fn innings_summary(model: &MatchModel, team: Team) -> InningsSummary {
    let innings = model.innings_batted_by(team);
    InningsSummary {
        team: model.teams.get(team).clone(),
        score: innings.score,
        wickets: innings.wickets,
        overs: innings.overs_notation(),
        run_rate: innings.run_rate().map(|r| round_to(r, 2)),
        extras: innings.extras,
    }
}

/// Over-by-over runs and wickets for both sides, over numbers ascending.
pub fn overs_comparison(model: &MatchModel) -> Vec<OversComparison> {
    let line = |team: Team, over: u32| {
        model
            .innings_batted_by(team)
            .overs
            .iter()
            .find(|o| o.over == over)
            .map(|o| OverLine {
                runs: o.runs,
                wickets: o.wickets,
            })
    };
    let mut overs: Vec<u32> = Team::ALL
        .iter()
        .flat_map(|&t| model.innings_batted_by(t).overs.iter().map(|o| o.over))
        .collect();
    overs.sort_unstable();
    overs.dedup();
    overs
        .into_iter()
        .map(|over| OversComparison {
            over,
            sides: TeamOptional::from_fn(|team| line(team, over)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::tests::ball;
    use crate::model::{build_innings, InningsSnapshot};

    fn chase_ball(over: u32, b: u32, runs: u32) -> crate::model::BallEvent {
        let mut ev = ball(over, b, "c", "d", "x", runs);
        ev.innings = 2;
        ev
    }

    fn tiny_model() -> MatchModel {
        let first: Vec<_> = (1..=6).map(|b| ball(1, b, "a", "b", "y", 1)).collect();
        let second: Vec<_> = (1..=6).map(|b| chase_ball(1, b, 2)).collect();
        MatchModel {
            teams: TeamPair::new("P".into(), "I".into()),
            total_overs: 2,
            innings: TeamPair::new(
                build_innings(Team::A, &first).unwrap(),
                build_innings(Team::B, &second).unwrap(),
            ),
        }
    }

    #[test]
    fn short_innings_omits_powerplay_key() {
        let report = MatchReport::build(&tiny_model(), &AnalysisSettings::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["best_powerplay"], serde_json::json!({}));
        assert!(json.get("batters_above_30").is_some());
        assert!(json.get("batters_above_50").is_some());
    }

    #[test]
    fn infeasible_allocation_is_omitted() {
        // one bowler per side cannot cover 2 overs at a cap of 1
        let settings = AnalysisSettings {
            max_overs_per_bowler: 1,
            ..AnalysisSettings::default()
        };
        let report = MatchReport::build(&tiny_model(), &settings);
        assert!(report.optimal_bowling_allocation.team_a.is_none());
        assert!(report.optimal_bowling_allocation.team_b.is_none());
    }

    #[test]
    fn overs_comparison_marks_missing_side() {
        let mut model = tiny_model();
        model.innings.team_b = InningsSnapshot::empty(Team::B);
        let rows = overs_comparison(&model);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].sides.team_a.is_some());
        assert!(rows[0].sides.team_b.is_none());
    }

    #[test]
    fn win_probability_needs_a_par_rate() {
        let mut model = tiny_model();
        model.innings.team_a = InningsSnapshot::empty(Team::A);
        assert!(query::win_probability(&model, &AnalysisSettings::default()).is_none());
        let settings = AnalysisSettings {
            par_run_rate: Some(8.0),
            ..AnalysisSettings::default()
        };
        assert_eq!(query::win_probability(&model, &settings).unwrap().len(), 1);
    }
}
