//! Batting and bowling leaderboards.

use serde::{Deserialize, Serialize};

use crate::model::{BattingRecord, BowlingRecord, PlayerId};

use super::round_to;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingEntry {
    pub player: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub sr: f64,
    pub fours: u32,
    pub sixes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlingEntry {
    pub name: PlayerId,
    pub overs: f64,
    pub runs: u32,
    pub wickets: u32,
    /// `None` for a bowler with no legal delivery
    pub economy: Option<f64>,
    pub maidens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattingSort {
    #[default]
    Runs,
    StrikeRate,
    Fours,
    Sixes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BowlingSort {
    #[default]
    Wickets,
    Runs,
    Economy,
}

impl BattingSort {
    pub const ALL: [BattingSort; 4] = [
        BattingSort::Runs,
        BattingSort::StrikeRate,
        BattingSort::Fours,
        BattingSort::Sixes,
    ];
}

impl BowlingSort {
    pub const ALL: [BowlingSort; 3] = [BowlingSort::Wickets, BowlingSort::Runs, BowlingSort::Economy];
}

/// Batters sorted best-first by `sort`; equal keys keep batting order.
pub fn batting_leaderboard(batting: &[BattingRecord], sort: BattingSort) -> Vec<BattingEntry> {
    let mut rows: Vec<&BattingRecord> = batting.iter().collect();
    match sort {
        BattingSort::Runs => rows.sort_by(|a, b| b.runs.cmp(&a.runs).then(a.balls.cmp(&b.balls))),
        BattingSort::StrikeRate => rows.sort_by(|a, b| b.strike_rate().total_cmp(&a.strike_rate())),
        BattingSort::Fours => rows.sort_by(|a, b| b.fours.cmp(&a.fours)),
        BattingSort::Sixes => rows.sort_by(|a, b| b.sixes.cmp(&a.sixes)),
    }
    rows.into_iter()
        .map(|r| BattingEntry {
            player: r.player.clone(),
            runs: r.runs,
            balls: r.balls,
            sr: round_to(r.strike_rate(), 2),
            fours: r.fours,
            sixes: r.sixes,
        })
        .collect()
}

/// Bowlers sorted best-first by `sort`: most wickets, fewest runs, or lowest
/// economy. Bowlers without an economy sort last on economy.
pub fn bowling_leaderboard(bowling: &[BowlingRecord], sort: BowlingSort) -> Vec<BowlingEntry> {
    let mut rows: Vec<&BowlingRecord> = bowling.iter().collect();
    let economy = |r: &BowlingRecord| r.economy().unwrap_or(f64::INFINITY);
    match sort {
        BowlingSort::Wickets => rows.sort_by(|a, b| {
            b.wickets
                .cmp(&a.wickets)
                .then(economy(a).total_cmp(&economy(b)))
        }),
        BowlingSort::Runs => rows.sort_by(|a, b| a.runs_conceded.cmp(&b.runs_conceded)),
        BowlingSort::Economy => rows.sort_by(|a, b| economy(a).total_cmp(&economy(b))),
    }
    rows.into_iter()
        .map(|r| BowlingEntry {
            name: r.player.clone(),
            overs: round_to(r.overs(), 1),
            runs: r.runs_conceded,
            wickets: r.wickets,
            economy: r.economy().map(|e| round_to(e, 2)),
            maidens: r.maidens,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bat(player: &str, runs: u32, balls: u32, fours: u32, sixes: u32) -> BattingRecord {
        BattingRecord {
            player: player.into(),
            runs,
            balls,
            fours,
            sixes,
            dismissed: true,
        }
    }

    fn bowl(player: &str, runs: u32, legal: u32, wickets: u32) -> BowlingRecord {
        let mut r = BowlingRecord::new(player.into());
        r.runs_conceded = runs;
        r.legal_deliveries = legal;
        r.wickets = wickets;
        r
    }

    #[test]
    fn batting_by_runs_and_strike_rate() {
        let batting = vec![bat("a", 57, 38, 5, 3), bat("b", 46, 35, 6, 2), bat("c", 14, 8, 0, 2)];
        let by_runs = batting_leaderboard(&batting, BattingSort::Runs);
        assert_eq!(by_runs[0].player, "a");
        assert_relative_eq!(by_runs[0].sr, 150.0);
        let by_sr = batting_leaderboard(&batting, BattingSort::StrikeRate);
        assert_eq!(by_sr[0].player, "c");
        assert_eq!(batting_leaderboard(&batting, BattingSort::Fours)[0].player, "b");
    }

    #[test]
    fn bowling_sorts() {
        let bowling = vec![bowl("x", 31, 24, 4), bowl("y", 26, 24, 2), bowl("z", 9, 6, 0), bowl("w", 0, 0, 0)];
        let by_wkts = bowling_leaderboard(&bowling, BowlingSort::Wickets);
        assert_eq!(by_wkts[0].name, "x");
        assert_relative_eq!(by_wkts[0].overs, 4.0);
        assert_relative_eq!(by_wkts[0].economy.unwrap(), 7.75);

        let by_econ = bowling_leaderboard(&bowling, BowlingSort::Economy);
        let names: Vec<_> = by_econ.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["y", "x", "z", "w"]);
        assert_eq!(by_econ[3].economy, None);

        assert_eq!(bowling_leaderboard(&bowling, BowlingSort::Runs)[0].name, "w");
    }
}
