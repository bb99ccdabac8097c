//! Named per-team queries over the match model.
//!
//! Batting-derived queries (leaderboards, matchups, momentum, range index,
//! patterns, clusters) describe the innings the team *batted*. Bowling-derived
//! queries (centrality, assignment, allocation, recommender, bowling board)
//! describe the innings the team *bowled*.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::allocation::{self, AllocationPlan};
use crate::engine::clustering;
use crate::engine::leaderboard::{self, BattingEntry, BattingSort, BowlingEntry, BowlingSort};
use crate::engine::matchup::{Assignment, BowlerCentrality, MatchupGraph, MatchupLine, MatchupPick};
use crate::engine::momentum::{self, PowerplayWindow, RunRatePoint};
use crate::engine::name_index::NameTrie;
use crate::engine::patterns::{self, DuplicateOvers};
use crate::engine::range_index::{RunsEntry, RunsRangeIndex};
use crate::engine::recommender::{BowlerRecommender, Recommendation};
use crate::engine::win_probability::{self, ChaseModel, WinProbabilityPoint};
use crate::engine::OrderedMap;
use crate::error::Result;
use crate::model::{InningsSnapshot, MatchModel, Partnership, PlayerId, Team};

use super::AnalysisSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    BattingLeaderboard,
    BowlingLeaderboard,
    WeakestBowlerMatchups,
    StrongestBowlerMatchups,
    BowlerCentrality,
    OptimalAssignment,
    BestPowerplay,
    RollingRunRate,
    BattersAbove,
    PlayerSearch,
    OptimalBowlingAllocation,
    ScoringPatterns,
    DuplicateOvers,
    SimilarOvers,
    RecurringSequences,
    BatterClusters,
    NextBowlerRecommendation,
    BatterVsBowler,
    Partnerships,
    WinProbability,
}

impl QueryKind {
    pub const ALL: [QueryKind; 20] = [
        QueryKind::BattingLeaderboard,
        QueryKind::BowlingLeaderboard,
        QueryKind::WeakestBowlerMatchups,
        QueryKind::StrongestBowlerMatchups,
        QueryKind::BowlerCentrality,
        QueryKind::OptimalAssignment,
        QueryKind::BestPowerplay,
        QueryKind::RollingRunRate,
        QueryKind::BattersAbove,
        QueryKind::PlayerSearch,
        QueryKind::OptimalBowlingAllocation,
        QueryKind::ScoringPatterns,
        QueryKind::DuplicateOvers,
        QueryKind::SimilarOvers,
        QueryKind::RecurringSequences,
        QueryKind::BatterClusters,
        QueryKind::NextBowlerRecommendation,
        QueryKind::BatterVsBowler,
        QueryKind::Partnerships,
        QueryKind::WinProbability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::BattingLeaderboard => "batting_leaderboard",
            QueryKind::BowlingLeaderboard => "bowling_leaderboard",
            QueryKind::WeakestBowlerMatchups => "weakest_bowler_matchups",
            QueryKind::StrongestBowlerMatchups => "strongest_bowler_matchups",
            QueryKind::BowlerCentrality => "bowler_centrality",
            QueryKind::OptimalAssignment => "optimal_assignment",
            QueryKind::BestPowerplay => "best_powerplay",
            QueryKind::RollingRunRate => "rolling_run_rate",
            QueryKind::BattersAbove => "batters_above",
            QueryKind::PlayerSearch => "player_search",
            QueryKind::OptimalBowlingAllocation => "optimal_bowling_allocation",
            QueryKind::ScoringPatterns => "scoring_patterns",
            QueryKind::DuplicateOvers => "duplicate_overs",
            QueryKind::SimilarOvers => "similar_overs",
            QueryKind::RecurringSequences => "recurring_sequences",
            QueryKind::BatterClusters => "batter_clusters",
            QueryKind::NextBowlerRecommendation => "next_bowler_recommendation",
            QueryKind::BatterVsBowler => "batter_vs_bowler",
            QueryKind::Partnerships => "partnerships",
            QueryKind::WinProbability => "win_probability",
        }
    }

    pub fn parse(s: &str) -> Option<QueryKind> {
        QueryKind::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Whether the result depends on the request parameters.
    pub fn uses_params(self) -> bool {
        matches!(self, QueryKind::BattersAbove | QueryKind::PlayerSearch)
    }
}

/// Optional query parameters. Part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct QueryParams {
    pub threshold: Option<u32>,
    pub prefix: Option<String>,
}

/// Queries answered from one team's point of view.
pub struct TeamView<'a> {
    model: &'a MatchModel,
    settings: &'a AnalysisSettings,
    team: Team,
}

impl<'a> TeamView<'a> {
    pub fn new(model: &'a MatchModel, settings: &'a AnalysisSettings, team: Team) -> Self {
        TeamView {
            model,
            settings,
            team,
        }
    }

    fn batted(&self) -> &'a InningsSnapshot {
        self.model.innings_batted_by(self.team)
    }

    fn bowled(&self) -> &'a InningsSnapshot {
        self.model.innings_bowled_by(self.team)
    }

    pub fn batting_leaderboard(&self, sort: BattingSort) -> Vec<BattingEntry> {
        leaderboard::batting_leaderboard(&self.batted().batting, sort)
    }

    pub fn bowling_leaderboard(&self, sort: BowlingSort) -> Vec<BowlingEntry> {
        leaderboard::bowling_leaderboard(&self.bowled().bowling, sort)
    }

    pub fn weakest_bowler_matchups(&self) -> OrderedMap<MatchupPick> {
        MatchupGraph::from_innings(self.batted()).weakest_bowler_matchups()
    }

    pub fn strongest_bowler_matchups(&self) -> OrderedMap<MatchupPick> {
        MatchupGraph::from_innings(self.batted()).strongest_bowler_matchups()
    }

    pub fn batter_vs_bowler(&self) -> OrderedMap<Vec<MatchupLine>> {
        MatchupGraph::from_innings(self.batted()).matchup_table()
    }

    pub fn bowler_centrality(&self) -> OrderedMap<BowlerCentrality> {
        MatchupGraph::from_innings(self.bowled()).bowler_centrality()
    }

    pub fn optimal_assignment(&self) -> Vec<Assignment> {
        MatchupGraph::from_innings(self.bowled()).optimal_assignment()
    }

    pub fn best_powerplay(&self) -> Option<PowerplayWindow> {
        momentum::best_window(&self.batted().overs, self.settings.powerplay_overs)
    }

    pub fn rolling_run_rate(&self) -> Vec<RunRatePoint> {
        momentum::rolling_run_rate(&self.batted().overs, self.settings.powerplay_overs)
    }

    pub fn range_index(&self) -> RunsRangeIndex {
        RunsRangeIndex::new(&self.batted().batting)
    }

    pub fn batters_above(&self, threshold: u32) -> Vec<RunsEntry> {
        self.range_index().at_least(threshold)
    }

    pub fn name_index(&self) -> NameTrie {
        NameTrie::new(self.model.squad(self.team))
    }

    /// `search_<prefix>` → matches, for every configured prefix.
    pub fn player_search(&self) -> OrderedMap<Vec<PlayerId>> {
        let trie = self.name_index();
        self.settings
            .search_prefixes
            .iter()
            .map(|p| (format!("search_{}", p), trie.search(p)))
            .collect()
    }

    pub fn optimal_bowling_allocation(&self) -> Result<AllocationPlan> {
        let rates = allocation::rates_from_bowling(&self.bowled().bowling);
        allocation::optimize(&rates, self.model.total_overs, self.settings.max_overs_per_bowler)
    }

    pub fn scoring_patterns(&self) -> OrderedMap<u32> {
        patterns::scoring_patterns(self.batted())
    }

    pub fn duplicate_overs(&self) -> Vec<DuplicateOvers> {
        patterns::duplicate_overs(self.batted())
    }

    pub fn similar_overs(&self) -> OrderedMap<Vec<u32>> {
        patterns::similar_overs(self.batted())
    }

    pub fn recurring_sequences(&self) -> OrderedMap<u32> {
        patterns::recurring_sequences(self.batted())
    }

    pub fn batter_clusters(&self) -> OrderedMap<Vec<PlayerId>> {
        clustering::batter_clusters(self.batted())
    }

    pub fn recommender(&self) -> BowlerRecommender {
        BowlerRecommender::new(&self.bowled().bowling, self.settings.max_overs_per_bowler)
    }

    pub fn next_bowler_recommendation(&self) -> Option<Recommendation> {
        self.recommender().recommend_next()
    }

    pub fn partnerships(&self) -> &'a [Partnership] {
        &self.batted().partnerships
    }
}

/// Reference run rate for the chase: configured, else the first innings' rate.
pub fn par_run_rate(model: &MatchModel, settings: &AnalysisSettings) -> Option<f64> {
    settings
        .par_run_rate
        .or_else(|| model.innings.team_a.run_rate())
}

/// Chase win probability by over; `None` when no par rate is available.
pub fn win_probability(model: &MatchModel, settings: &AnalysisSettings) -> Option<Vec<WinProbabilityPoint>> {
    let par = par_run_rate(model, settings)?;
    Some(win_probability::win_probability_series(model, &ChaseModel::new(par)))
}

/// Evaluate one named query as JSON. `Ok(None)` means the result is absent
/// (e.g. no powerplay window for a short innings).
pub fn run_query(
    model: &MatchModel,
    settings: &AnalysisSettings,
    team: Team,
    kind: QueryKind,
    params: &QueryParams,
) -> Result<Option<serde_json::Value>> {
    debug!("Computing {} for {}", kind.as_str(), team.key());
    let view = TeamView::new(model, settings, team);
    let value = match kind {
        QueryKind::BattingLeaderboard => serde_json::to_value(view.batting_leaderboard(BattingSort::Runs))?,
        QueryKind::BowlingLeaderboard => serde_json::to_value(view.bowling_leaderboard(BowlingSort::Wickets))?,
        QueryKind::WeakestBowlerMatchups => serde_json::to_value(view.weakest_bowler_matchups())?,
        QueryKind::StrongestBowlerMatchups => serde_json::to_value(view.strongest_bowler_matchups())?,
        QueryKind::BowlerCentrality => serde_json::to_value(view.bowler_centrality())?,
        QueryKind::OptimalAssignment => serde_json::to_value(view.optimal_assignment())?,
        QueryKind::BestPowerplay => match view.best_powerplay() {
            Some(window) => serde_json::to_value(window)?,
            None => return Ok(None),
        },
        QueryKind::RollingRunRate => serde_json::to_value(view.rolling_run_rate())?,
        QueryKind::BattersAbove => {
            let threshold = params
                .threshold
                .or_else(|| settings.run_thresholds.first().copied())
                .unwrap_or(0);
            serde_json::to_value(view.batters_above(threshold))?
        }
        QueryKind::PlayerSearch => match &params.prefix {
            Some(prefix) => serde_json::to_value(view.name_index().search(prefix))?,
            None => serde_json::to_value(view.player_search())?,
        },
        QueryKind::OptimalBowlingAllocation => serde_json::to_value(view.optimal_bowling_allocation()?)?,
        QueryKind::ScoringPatterns => serde_json::to_value(view.scoring_patterns())?,
        QueryKind::DuplicateOvers => serde_json::to_value(view.duplicate_overs())?,
        QueryKind::SimilarOvers => serde_json::to_value(view.similar_overs())?,
        QueryKind::RecurringSequences => serde_json::to_value(view.recurring_sequences())?,
        QueryKind::BatterClusters => serde_json::to_value(view.batter_clusters())?,
        QueryKind::NextBowlerRecommendation => match view.next_bowler_recommendation() {
            Some(rec) => serde_json::to_value(rec)?,
            None => return Ok(None),
        },
        QueryKind::BatterVsBowler => serde_json::to_value(view.batter_vs_bowler())?,
        QueryKind::Partnerships => serde_json::to_value(view.partnerships())?,
        QueryKind::WinProbability => match win_probability(model, settings) {
            Some(series) => serde_json::to_value(series)?,
            None => return Ok(None),
        },
    };
    Ok(Some(value))
}
