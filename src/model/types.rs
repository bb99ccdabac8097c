use serde::{Deserialize, Serialize};

/// Player identifier. Feeds identify players by display name.
pub type PlayerId = String;

/// One of the two sides in a match.
///
/// `A` bats first (the defending side), `B` bats second (the chasing side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "teamA")]
    A,
    #[serde(rename = "teamB")]
    B,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::A, Team::B];

    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Innings number (1-based) in which this team bats.
    pub fn innings_number(self) -> u8 {
        match self {
            Team::A => 1,
            Team::B => 2,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Team::A => "teamA",
            Team::B => "teamB",
        }
    }

    pub fn parse(s: &str) -> Option<Team> {
        match s {
            "teamA" | "a" | "A" => Some(Team::A),
            "teamB" | "b" | "B" => Some(Team::B),
            _ => None,
        }
    }
}

/// A value held for each side, addressed by [`Team`] instead of string keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPair<T> {
    #[serde(rename = "teamA")]
    pub team_a: T,
    #[serde(rename = "teamB")]
    pub team_b: T,
}

impl<T> TeamPair<T> {
    pub fn new(team_a: T, team_b: T) -> Self {
        TeamPair { team_a, team_b }
    }

    pub fn from_fn(mut f: impl FnMut(Team) -> T) -> Self {
        TeamPair {
            team_a: f(Team::A),
            team_b: f(Team::B),
        }
    }

    pub fn get(&self, team: Team) -> &T {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(Team) -> Result<T, E>) -> Result<Self, E> {
        Ok(TeamPair {
            team_a: f(Team::A)?,
            team_b: f(Team::B)?,
        })
    }
}

/// Query results that may be absent for a side serialize with the key omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamOptional<T> {
    #[serde(rename = "teamA", skip_serializing_if = "Option::is_none")]
    pub team_a: Option<T>,
    #[serde(rename = "teamB", skip_serializing_if = "Option::is_none")]
    pub team_b: Option<T>,
}

impl<T> TeamOptional<T> {
    pub fn from_fn(mut f: impl FnMut(Team) -> Option<T>) -> Self {
        TeamOptional {
            team_a: f(Team::A),
            team_b: f(Team::B),
        }
    }

    pub fn get(&self, team: Team) -> Option<&T> {
        match team {
            Team::A => self.team_a.as_ref(),
            Team::B => self.team_b.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKind {
    Wide,
    NoBall,
    Bye,
    LegBye,
    Penalty,
}

impl ExtraKind {
    /// Wides and no-balls must be re-bowled.
    pub fn is_legal(self) -> bool {
        !matches!(self, ExtraKind::Wide | ExtraKind::NoBall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    pub kind: ExtraKind,
    pub runs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalKind {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    HitWicket,
    RunOut,
    /// Wicket with no recorded mode (compact feeds); credited to the bowler.
    Other,
}

impl DismissalKind {
    pub fn credited_to_bowler(self) -> bool {
        !matches!(self, DismissalKind::RunOut)
    }

    pub fn label(self) -> &'static str {
        match self {
            DismissalKind::Bowled => "bowled",
            DismissalKind::Caught => "caught",
            DismissalKind::Lbw => "lbw",
            DismissalKind::Stumped => "stumped",
            DismissalKind::HitWicket => "hit wicket",
            DismissalKind::RunOut => "run out",
            DismissalKind::Other => "out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wicket {
    pub kind: DismissalKind,
    pub player_out: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fielder: Option<PlayerId>,
}

/// A single delivery. Immutable; the sole input to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    /// 1 for the first innings, 2 for the chase
    pub innings: u8,
    /// 1-based over number
    pub over: u32,
    /// Delivery index within the over; extras push it past 6
    pub ball: u32,
    pub batter: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    #[serde(default)]
    pub runs_off_bat: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Extras>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket: Option<Wicket>,
}

impl BallEvent {
    pub fn is_legal(&self) -> bool {
        self.extras.map_or(true, |e| e.kind.is_legal())
    }

    pub fn extra_runs(&self) -> u32 {
        self.extras.map_or(0, |e| e.runs)
    }

    /// Every run added to the total on this delivery.
    pub fn total_runs(&self) -> u32 {
        self.runs_off_bat.saturating_add(self.extra_runs())
    }

    /// `None` when the run values cannot be summed in a `u32`.
    pub fn checked_total_runs(&self) -> Option<u32> {
        self.runs_off_bat.checked_add(self.extra_runs())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingRecord {
    pub player: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissed: bool,
}

impl BattingRecord {
    pub fn new(player: PlayerId) -> Self {
        BattingRecord {
            player,
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            dismissed: false,
        }
    }

    /// Runs per 100 balls; 0 when no balls faced.
    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            self.runs as f64 * 100.0 / self.balls as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingRecord {
    pub player: PlayerId,
    pub legal_deliveries: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
    /// Over numbers this bowler bowled in, in order
    pub over_numbers: Vec<u32>,
}

impl BowlingRecord {
    pub fn new(player: PlayerId) -> Self {
        BowlingRecord {
            player,
            legal_deliveries: 0,
            runs_conceded: 0,
            wickets: 0,
            maidens: 0,
            over_numbers: Vec::new(),
        }
    }

    pub fn overs(&self) -> f64 {
        self.legal_deliveries as f64 / 6.0
    }

    /// Runs per six legal deliveries; undefined with no legal deliveries.
    pub fn economy(&self) -> Option<f64> {
        if self.legal_deliveries == 0 {
            None
        } else {
            Some(self.runs_conceded as f64 * 6.0 / self.legal_deliveries as f64)
        }
    }

    pub fn overs_used(&self) -> u32 {
        self.over_numbers.len() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipEnd {
    Wicket,
    Retirement,
    InningsClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partnership {
    /// (batter on strike when the stand began, partner)
    pub batters: (PlayerId, PlayerId),
    pub runs: u32,
    pub balls: u32,
    pub ended_by: PartnershipEnd,
}

impl Partnership {
    pub fn involves(&self, player: &str) -> bool {
        self.batters.0 == player || self.batters.1 == player
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverSummary {
    pub over: u32,
    pub bowler: PlayerId,
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
}

/// Fall-of-wicket entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dismissal {
    pub player_out: PlayerId,
    pub kind: DismissalKind,
    /// Bowler credited with the wicket, if any
    pub bowler: Option<PlayerId>,
    pub fielder: Option<PlayerId>,
    pub over: u32,
    pub ball: u32,
    pub team_score: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasTally {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
    pub penalties: u32,
}

impl ExtrasTally {
    pub fn add(&mut self, extras: Extras) {
        match extras.kind {
            ExtraKind::Wide => self.wides += extras.runs,
            ExtraKind::NoBall => self.no_balls += extras.runs,
            ExtraKind::Bye => self.byes += extras.runs,
            ExtraKind::LegBye => self.leg_byes += extras.runs,
            ExtraKind::Penalty => self.penalties += extras.runs,
        }
    }

    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes + self.penalties
    }
}
