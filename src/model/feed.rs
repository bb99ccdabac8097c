//! Match feed decoding.
//!
//! Two innings encodings are accepted: explicit ball events, and the compact
//! scorecard shorthand (`0`, `4`, `W`, `WD`, `NB2`, `LB1`, `B1`, ...) which is
//! expanded here into ball events by replaying strike rotation.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AnalyticsError, Result};

use super::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFeed {
    pub teams: TeamPair<String>,
    #[serde(default = "default_total_overs")]
    pub total_overs: u32,
    /// First innings (teamA batting), then the chase (teamB batting)
    pub innings: Vec<InningsFeed>,
}

fn default_total_overs() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum InningsFeed {
    Events {
        events: Vec<BallEvent>,
    },
    Compact {
        batting_order: Vec<PlayerId>,
        /// Bowler of each over; cycled when shorter than the innings
        over_bowlers: Vec<PlayerId>,
        deliveries: Vec<String>,
    },
}

impl MatchFeed {
    pub fn from_json(raw: &str) -> Result<Self> {
        let feed: MatchFeed =
            serde_json::from_str(raw).map_err(|e| AnalyticsError::Feed(e.to_string()))?;
        if feed.innings.len() != 2 {
            return Err(AnalyticsError::Feed(format!(
                "expected 2 innings, got {}",
                feed.innings.len()
            )));
        }
        Ok(feed)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::Feed(format!("{}: {}", path.display(), e)))?;
        let feed = Self::from_json(&raw)?;
        info!(
            "Loaded match feed {}: {} vs {}",
            path.display(),
            feed.teams.team_a,
            feed.teams.team_b
        );
        Ok(feed)
    }

    /// Ball events for the innings `team` batted in.
    pub fn innings_events(&self, team: Team) -> Result<Vec<BallEvent>> {
        let idx = usize::from(team.innings_number() - 1);
        match self.innings.get(idx) {
            Some(InningsFeed::Events { events }) => Ok(events.clone()),
            Some(InningsFeed::Compact {
                batting_order,
                over_bowlers,
                deliveries,
            }) => expand_compact(team.innings_number(), batting_order, over_bowlers, deliveries),
            None => Ok(Vec::new()),
        }
    }
}

/// A compact delivery token, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Runs(u32),
    Wicket,
    Wide(u32),
    NoBall(u32),
    LegBye(u32),
    Bye(u32),
}

fn parse_token(raw: &str) -> Option<Token> {
    let t = raw.trim().to_ascii_uppercase();
    let count = |digits: &str, default: u32| -> Option<u32> {
        if digits.is_empty() {
            Some(default)
        } else {
            digits.parse().ok()
        }
    };
    if t == "W" {
        Some(Token::Wicket)
    } else if let Some(rest) = t.strip_prefix("WD") {
        count(rest, 0).map(Token::Wide)
    } else if let Some(rest) = t.strip_prefix("NB") {
        count(rest, 0).map(Token::NoBall)
    } else if let Some(rest) = t.strip_prefix("LB") {
        count(rest, 1).map(Token::LegBye)
    } else if let Some(rest) = t.strip_prefix('B') {
        count(rest, 1).map(Token::Bye)
    } else {
        t.parse().ok().map(Token::Runs)
    }
}

/// Replay compact tokens into ball events.
///
/// Strike changes on odd runs and at the end of each over. A dismissed
/// striker is replaced by the next batter in order; an over ends after six
/// legal deliveries.
pub fn expand_compact(
    innings: u8,
    batting_order: &[PlayerId],
    over_bowlers: &[PlayerId],
    deliveries: &[String],
) -> Result<Vec<BallEvent>> {
    if deliveries.is_empty() {
        return Ok(Vec::new());
    }
    let malformed = |over, ball, reason: String| AnalyticsError::malformed(innings, over, ball, reason);
    if over_bowlers.is_empty() {
        return Err(malformed(1, 1, "no bowlers listed".into()));
    }
    let mut queue: VecDeque<&PlayerId> = batting_order.iter().collect();
    let (mut striker, mut non_striker) = match (queue.pop_front(), queue.pop_front()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(malformed(1, 1, "batting order needs two openers".into())),
    };

    let mut events = Vec::with_capacity(deliveries.len());
    let mut over = 1u32;
    let mut ball = 0u32;
    let mut legal_in_over = 0u32;
    let mut all_out = false;

    for raw in deliveries {
        ball += 1;
        if all_out {
            return Err(malformed(over, ball, "delivery after the innings was all out".into()));
        }
        let token = parse_token(raw)
            .ok_or_else(|| malformed(over, ball, format!("unknown delivery token {:?}", raw)))?;
        let bowler = &over_bowlers[(over as usize - 1) % over_bowlers.len()];

        let mut ev = BallEvent {
            innings,
            over,
            ball,
            batter: striker.clone(),
            non_striker: non_striker.clone(),
            bowler: bowler.clone(),
            runs_off_bat: 0,
            extras: None,
            wicket: None,
        };
        let ran = match token {
            Token::Runs(n) => {
                ev.runs_off_bat = n;
                n
            }
            Token::Wicket => {
                ev.wicket = Some(Wicket {
                    kind: DismissalKind::Other,
                    player_out: striker.clone(),
                    fielder: None,
                });
                0
            }
            Token::Wide(n) => {
                ev.extras = Some(Extras {
                    kind: ExtraKind::Wide,
                    runs: 1 + n,
                });
                n
            }
            Token::NoBall(n) => {
                ev.runs_off_bat = n;
                ev.extras = Some(Extras {
                    kind: ExtraKind::NoBall,
                    runs: 1,
                });
                n
            }
            Token::LegBye(n) => {
                ev.extras = Some(Extras {
                    kind: ExtraKind::LegBye,
                    runs: n,
                });
                n
            }
            Token::Bye(n) => {
                ev.extras = Some(Extras {
                    kind: ExtraKind::Bye,
                    runs: n,
                });
                n
            }
        };
        let legal = ev.is_legal();
        events.push(ev);

        if token == Token::Wicket {
            match queue.pop_front() {
                Some(next) => striker = next,
                None => all_out = true,
            }
        } else if ran % 2 == 1 {
            std::mem::swap(&mut striker, &mut non_striker);
        }

        if legal {
            legal_in_over += 1;
            if legal_in_over == 6 {
                over += 1;
                ball = 0;
                legal_in_over = 0;
                std::mem::swap(&mut striker, &mut non_striker);
            }
        }
    }
    Ok(events)
}
