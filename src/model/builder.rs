//! Match Model Builder.
//!
//! Folds ball events, strictly in delivery order, into per-innings aggregates.
//! Every downstream query reads the immutable [`InningsSnapshot`] produced
//! here and nothing else.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AnalyticsError, Result};

use super::feed::MatchFeed;
use super::types::*;

const MAX_WICKETS: u32 = 10;

/// Immutable aggregate of one team's batting effort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InningsSnapshot {
    pub batting_team: Team,
    pub events: Vec<BallEvent>,
    /// In order of first appearance at the crease
    pub batting: Vec<BattingRecord>,
    /// In order of first delivery bowled
    pub bowling: Vec<BowlingRecord>,
    pub overs: Vec<OverSummary>,
    pub partnerships: Vec<Partnership>,
    pub dismissals: Vec<Dismissal>,
    pub extras: ExtrasTally,
    pub score: u32,
    pub wickets: u32,
    pub legal_balls: u32,
}

impl InningsSnapshot {
    pub fn empty(batting_team: Team) -> Self {
        InningsBuilder::new(batting_team).finish()
    }

    /// Overs faced in cricket notation, e.g. "19.1".
    pub fn overs_notation(&self) -> String {
        format!("{}.{}", self.legal_balls / 6, self.legal_balls % 6)
    }

    /// Runs per six legal deliveries.
    pub fn run_rate(&self) -> Option<f64> {
        if self.legal_balls == 0 {
            None
        } else {
            Some(self.score as f64 * 6.0 / self.legal_balls as f64)
        }
    }

    pub fn batting_record(&self, player: &str) -> Option<&BattingRecord> {
        self.batting.iter().find(|b| b.player == player)
    }

    pub fn bowling_record(&self, player: &str) -> Option<&BowlingRecord> {
        self.bowling.iter().find(|b| b.player == player)
    }
}

/// Both innings of a match plus the format constants they were played under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchModel {
    pub teams: TeamPair<String>,
    pub total_overs: u32,
    /// Keyed by batting side
    pub innings: TeamPair<InningsSnapshot>,
}

impl MatchModel {
    pub fn build(feed: &MatchFeed) -> Result<Self> {
        let innings = TeamPair::try_from_fn(|team| {
            let events = feed.innings_events(team)?;
            let snapshot = build_innings(team, &events)?;
            info!(
                "Innings {} ({}): {}/{} in {} overs, {} partnerships",
                team.innings_number(),
                feed.teams.get(team),
                snapshot.score,
                snapshot.wickets,
                snapshot.overs_notation(),
                snapshot.partnerships.len()
            );
            Ok::<_, AnalyticsError>(snapshot)
        })?;
        Ok(MatchModel {
            teams: feed.teams.clone(),
            total_overs: feed.total_overs,
            innings,
        })
    }

    pub fn innings_batted_by(&self, team: Team) -> &InningsSnapshot {
        self.innings.get(team)
    }

    pub fn innings_bowled_by(&self, team: Team) -> &InningsSnapshot {
        self.innings.get(team.opponent())
    }

    /// Runs the chasing side needs to win.
    pub fn target(&self) -> u32 {
        self.innings.team_a.score + 1
    }

    /// Every player who batted or bowled for `team`, first appearance order.
    pub fn squad(&self, team: Team) -> Vec<PlayerId> {
        let mut seen = HashSet::new();
        let batters = self.innings_batted_by(team).batting.iter().map(|b| &b.player);
        let bowlers = self.innings_bowled_by(team).bowling.iter().map(|b| &b.player);
        batters
            .chain(bowlers)
            .filter(|p| seen.insert(p.as_str()))
            .cloned()
            .collect()
    }
}

/// Fold one innings' events into a snapshot.
pub fn build_innings(batting_team: Team, events: &[BallEvent]) -> Result<InningsSnapshot> {
    let mut builder = InningsBuilder::new(batting_team);
    for ev in events {
        builder.fold(ev)?;
    }
    Ok(builder.finish())
}

struct OverAccumulator {
    over: u32,
    bowler: PlayerId,
    runs: u32,
    wickets: u32,
    legal_balls: u32,
    single_bowler: bool,
}

struct StandAccumulator {
    batters: (PlayerId, PlayerId),
    runs: u32,
    balls: u32,
}

impl StandAccumulator {
    fn same_pair(&self, a: &str, b: &str) -> bool {
        (self.batters.0 == a && self.batters.1 == b) || (self.batters.0 == b && self.batters.1 == a)
    }

    fn close(self, ended_by: PartnershipEnd) -> Partnership {
        Partnership {
            batters: self.batters,
            runs: self.runs,
            balls: self.balls,
            ended_by,
        }
    }
}

/// Incremental innings fold. Records are created on first appearance and
/// updated per event; `finish` freezes them.
pub struct InningsBuilder {
    innings: u8,
    batting_team: Team,
    events: Vec<BallEvent>,
    batting: Vec<BattingRecord>,
    batting_index: HashMap<PlayerId, usize>,
    bowling: Vec<BowlingRecord>,
    bowling_index: HashMap<PlayerId, usize>,
    overs: Vec<OverSummary>,
    current_over: Option<OverAccumulator>,
    partnerships: Vec<Partnership>,
    current_stand: Option<StandAccumulator>,
    dismissals: Vec<Dismissal>,
    dismissed: HashSet<PlayerId>,
    extras: ExtrasTally,
    score: u32,
    wickets: u32,
    legal_balls: u32,
    last_position: Option<(u32, u32)>,
}

impl InningsBuilder {
    pub fn new(batting_team: Team) -> Self {
        InningsBuilder {
            innings: batting_team.innings_number(),
            batting_team,
            events: Vec::new(),
            batting: Vec::new(),
            batting_index: HashMap::new(),
            bowling: Vec::new(),
            bowling_index: HashMap::new(),
            overs: Vec::new(),
            current_over: None,
            partnerships: Vec::new(),
            current_stand: None,
            dismissals: Vec::new(),
            dismissed: HashSet::new(),
            extras: ExtrasTally::default(),
            score: 0,
            wickets: 0,
            legal_balls: 0,
            last_position: None,
        }
    }

    fn reject(&self, ev: &BallEvent, reason: impl Into<String>) -> AnalyticsError {
        AnalyticsError::malformed(self.innings, ev.over, ev.ball, reason)
    }

    fn validate(&self, ev: &BallEvent) -> Result<()> {
        if ev.innings != self.innings {
            return Err(self.reject(
                ev,
                format!("event belongs to innings {}", ev.innings),
            ));
        }
        if let Some((over, ball)) = self.last_position {
            if ev.over < over {
                return Err(self.reject(ev, format!("over went backward from {}", over)));
            }
            if ev.over == over && ev.ball < ball {
                return Err(self.reject(ev, format!("ball went backward from {}.{}", over, ball)));
            }
        }
        if ev
            .checked_total_runs()
            .and_then(|runs| self.score.checked_add(runs))
            .is_none()
        {
            return Err(self.reject(ev, "run count overflows the innings total"));
        }
        if self.wickets >= MAX_WICKETS {
            return Err(self.reject(ev, "delivery after the innings was all out"));
        }
        if ev.batter == ev.non_striker {
            return Err(self.reject(ev, format!("{} listed at both ends", ev.batter)));
        }
        for player in [&ev.batter, &ev.non_striker] {
            if self.dismissed.contains(player) {
                return Err(self.reject(ev, format!("{} is already out", player)));
            }
        }
        if let Some(w) = &ev.wicket {
            if w.player_out != ev.batter && w.player_out != ev.non_striker {
                return Err(self.reject(ev, format!("{} is not at the crease", w.player_out)));
            }
        }
        Ok(())
    }

    /// Fold one delivery. Events must arrive in delivery order.
    pub fn fold(&mut self, ev: &BallEvent) -> Result<()> {
        self.validate(ev)?;
        self.last_position = Some((ev.over, ev.ball));

        let legal = ev.is_legal();
        let total = ev.total_runs();

        self.roll_over(ev);
        self.roll_partnership(ev);

        let striker = self.batter_mut(&ev.batter);
        striker.runs += ev.runs_off_bat;
        if legal {
            striker.balls += 1;
        }
        match ev.runs_off_bat {
            4 => striker.fours += 1,
            6 => striker.sixes += 1,
            _ => {}
        }
        self.batter_mut(&ev.non_striker);

        let bowler = self.bowler_mut(&ev.bowler);
        bowler.runs_conceded += total;
        if legal {
            bowler.legal_deliveries += 1;
        }
        if bowler.over_numbers.last() != Some(&ev.over) {
            bowler.over_numbers.push(ev.over);
        }

        if let Some(extras) = ev.extras {
            self.extras.add(extras);
        }
        self.score += total;
        if legal {
            self.legal_balls += 1;
        }

        if let Some(over) = self.current_over.as_mut() {
            over.runs += total;
            if legal {
                over.legal_balls += 1;
            }
            if over.bowler != ev.bowler {
                over.single_bowler = false;
            }
        }
        if let Some(stand) = self.current_stand.as_mut() {
            stand.runs += total;
            if legal {
                stand.balls += 1;
            }
        }

        if let Some(w) = &ev.wicket {
            self.record_wicket(ev, w);
        }

        self.events.push(ev.clone());
        Ok(())
    }

    fn record_wicket(&mut self, ev: &BallEvent, w: &Wicket) {
        self.wickets += 1;
        self.dismissed.insert(w.player_out.clone());
        self.batter_mut(&w.player_out).dismissed = true;

        let credited = w.kind.credited_to_bowler();
        if credited {
            self.bowler_mut(&ev.bowler).wickets += 1;
        }
        if let Some(over) = self.current_over.as_mut() {
            over.wickets += 1;
        }
        self.dismissals.push(Dismissal {
            player_out: w.player_out.clone(),
            kind: w.kind,
            bowler: credited.then(|| ev.bowler.clone()),
            fielder: w.fielder.clone(),
            over: ev.over,
            ball: ev.ball,
            team_score: self.score,
        });
        if let Some(stand) = self.current_stand.take() {
            self.partnerships.push(stand.close(PartnershipEnd::Wicket));
        }
        debug!(
            "Wicket: {} {} at {}/{} ({}.{})",
            w.player_out,
            w.kind.label(),
            self.score,
            self.wickets,
            ev.over,
            ev.ball
        );
    }

    fn roll_over(&mut self, ev: &BallEvent) {
        let same_over = self
            .current_over
            .as_ref()
            .map_or(false, |o| o.over == ev.over);
        if !same_over {
            self.close_over();
            self.current_over = Some(OverAccumulator {
                over: ev.over,
                bowler: ev.bowler.clone(),
                runs: 0,
                wickets: 0,
                legal_balls: 0,
                single_bowler: true,
            });
        }
    }

    fn close_over(&mut self) {
        if let Some(acc) = self.current_over.take() {
            if acc.single_bowler && acc.legal_balls == 6 && acc.runs == 0 {
                self.bowler_mut(&acc.bowler).maidens += 1;
            }
            self.overs.push(OverSummary {
                over: acc.over,
                bowler: acc.bowler,
                runs: acc.runs,
                wickets: acc.wickets,
                legal_balls: acc.legal_balls,
            });
        }
    }

    fn roll_partnership(&mut self, ev: &BallEvent) {
        let continues = self
            .current_stand
            .as_ref()
            .map_or(false, |s| s.same_pair(&ev.batter, &ev.non_striker));
        if continues {
            return;
        }
        if let Some(stand) = self.current_stand.take() {
            self.partnerships.push(stand.close(PartnershipEnd::Retirement));
        }
        self.current_stand = Some(StandAccumulator {
            batters: (ev.batter.clone(), ev.non_striker.clone()),
            runs: 0,
            balls: 0,
        });
    }

    fn batter_mut(&mut self, player: &str) -> &mut BattingRecord {
        let idx = match self.batting_index.get(player) {
            Some(&idx) => idx,
            None => {
                self.batting.push(BattingRecord::new(player.to_string()));
                self.batting_index
                    .insert(player.to_string(), self.batting.len() - 1);
                self.batting.len() - 1
            }
        };
        &mut self.batting[idx]
    }

    fn bowler_mut(&mut self, player: &str) -> &mut BowlingRecord {
        let idx = match self.bowling_index.get(player) {
            Some(&idx) => idx,
            None => {
                self.bowling.push(BowlingRecord::new(player.to_string()));
                self.bowling_index
                    .insert(player.to_string(), self.bowling.len() - 1);
                self.bowling.len() - 1
            }
        };
        &mut self.bowling[idx]
    }

    pub fn finish(mut self) -> InningsSnapshot {
        self.close_over();
        if let Some(stand) = self.current_stand.take() {
            self.partnerships.push(stand.close(PartnershipEnd::InningsClosed));
        }
        InningsSnapshot {
            batting_team: self.batting_team,
            events: self.events,
            batting: self.batting,
            bowling: self.bowling,
            overs: self.overs,
            partnerships: self.partnerships,
            dismissals: self.dismissals,
            extras: self.extras,
            score: self.score,
            wickets: self.wickets,
            legal_balls: self.legal_balls,
        }
    }
}
