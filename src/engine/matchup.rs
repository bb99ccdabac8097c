//! Batter ↔ bowler matchup graph.
//!
//! A bipartite graph whose nodes are the batters and bowlers of one innings
//! and whose edge weights are the aggregated [`Matchup`] for each pair.
//! Runs-per-ball comparisons are done on exact rationals (cross
//! multiplication) so ties are detected without float noise.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::model::{InningsSnapshot, PlayerId};

use super::{round_to, OrderedMap};

/// Aggregate of every delivery between one batter and one bowler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Matchup {
    /// Runs off the bat
    pub runs: u32,
    /// Legal deliveries faced
    pub balls: u32,
    /// Dismissals credited to the bowler
    pub dismissals: u32,
}

impl Matchup {
    pub fn runs_per_ball(&self) -> Option<f64> {
        (self.balls > 0).then(|| self.runs as f64 / self.balls as f64)
    }

    /// Compare runs-per-ball exactly. Both sides must have faced a ball.
    fn cmp_rate(&self, other: &Matchup) -> Ordering {
        let lhs = self.runs as u64 * other.balls as u64;
        let rhs = other.runs as u64 * self.balls as u64;
        lhs.cmp(&rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupPick {
    pub bowler: PlayerId,
    pub runs_per_ball: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlerCentrality {
    pub batters_faced: u32,
    pub wickets: u32,
    pub balls: u32,
    pub centrality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub batter: PlayerId,
    pub bowler: PlayerId,
    pub expected_runs_per_ball: f64,
}

/// One row of the per-batter matchup table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupLine {
    pub bowler: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub wicket: bool,
    pub sr: f64,
}

/// Upper bound of the normalized centrality score.
const CENTRALITY_SCALE: f64 = 10.0;
/// Weight of a wicket relative to one distinct batter faced.
const CENTRALITY_WICKET_WEIGHT: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct MatchupGraph {
    batters: Vec<PlayerId>,
    bowlers: Vec<PlayerId>,
    /// batter index → (bowler index, matchup), in first-faced order
    adjacency: Vec<Vec<(usize, Matchup)>>,
}

impl MatchupGraph {
    pub fn from_innings(innings: &InningsSnapshot) -> Self {
        let mut graph = MatchupGraph::default();
        let mut batter_idx: HashMap<&str, usize> = HashMap::new();
        let mut bowler_idx: HashMap<&str, usize> = HashMap::new();

        for ev in &innings.events {
            let b = *batter_idx.entry(ev.batter.as_str()).or_insert_with(|| {
                graph.batters.push(ev.batter.clone());
                graph.adjacency.push(Vec::new());
                graph.batters.len() - 1
            });
            let w = *bowler_idx.entry(ev.bowler.as_str()).or_insert_with(|| {
                graph.bowlers.push(ev.bowler.clone());
                graph.bowlers.len() - 1
            });

            let edges = &mut graph.adjacency[b];
            let pos = match edges.iter().position(|(bw, _)| *bw == w) {
                Some(pos) => pos,
                None => {
                    edges.push((w, Matchup::default()));
                    edges.len() - 1
                }
            };
            let edge = &mut edges[pos].1;
            edge.runs += ev.runs_off_bat;
            if ev.is_legal() {
                edge.balls += 1;
            }
            if let Some(wk) = &ev.wicket {
                if wk.player_out == ev.batter && wk.kind.credited_to_bowler() {
                    edge.dismissals += 1;
                }
            }
        }
        graph
    }

    pub fn batters(&self) -> &[PlayerId] {
        &self.batters
    }

    pub fn bowlers(&self) -> &[PlayerId] {
        &self.bowlers
    }

    pub fn edge(&self, batter: &str, bowler: &str) -> Option<Matchup> {
        let b = self.batters.iter().position(|p| p == batter)?;
        self.adjacency[b]
            .iter()
            .find(|(w, _)| self.bowlers[*w] == bowler)
            .map(|(_, m)| *m)
    }

    fn faced_edges(&self, batter: usize) -> impl Iterator<Item = &(usize, Matchup)> {
        self.adjacency[batter].iter().filter(|(_, m)| m.balls > 0)
    }

    fn pick(&self, bowler: usize, m: &Matchup) -> MatchupPick {
        MatchupPick {
            bowler: self.bowlers[bowler].clone(),
            runs_per_ball: round_to(m.runs_per_ball().unwrap_or(0.0), 2),
        }
    }

    /// The bowler this batter scored fastest against. Ties go to the edge
    /// with more balls faced, then to the bowler faced first.
    pub fn weakest_bowler_for(&self, batter: &str) -> Option<MatchupPick> {
        let b = self.batters.iter().position(|p| p == batter)?;
        let mut best: Option<&(usize, Matchup)> = None;
        for edge in self.faced_edges(b) {
            let better = match best {
                None => true,
                Some((_, cur)) => match edge.1.cmp_rate(cur) {
                    Ordering::Greater => true,
                    Ordering::Equal => edge.1.balls > cur.balls,
                    Ordering::Less => false,
                },
            };
            if better {
                best = Some(edge);
            }
        }
        best.map(|(w, m)| self.pick(*w, m))
    }

    /// The bowler this batter scored slowest against, among edges with at
    /// least one ball faced.
    pub fn strongest_bowler_for(&self, batter: &str) -> Option<MatchupPick> {
        let b = self.batters.iter().position(|p| p == batter)?;
        let mut best: Option<&(usize, Matchup)> = None;
        for edge in self.faced_edges(b) {
            let better = match best {
                None => true,
                Some((_, cur)) => match edge.1.cmp_rate(cur) {
                    Ordering::Less => true,
                    Ordering::Equal => edge.1.balls > cur.balls,
                    Ordering::Greater => false,
                },
            };
            if better {
                best = Some(edge);
            }
        }
        best.map(|(w, m)| self.pick(*w, m))
    }

    pub fn weakest_bowler_matchups(&self) -> OrderedMap<MatchupPick> {
        self.batters
            .iter()
            .filter_map(|b| self.weakest_bowler_for(b).map(|p| (b.clone(), p)))
            .collect()
    }

    pub fn strongest_bowler_matchups(&self) -> OrderedMap<MatchupPick> {
        self.batters
            .iter()
            .filter_map(|b| self.strongest_bowler_for(b).map(|p| (b.clone(), p)))
            .collect()
    }

    /// Per-bowler dominance: `wickets × 2 + distinct batters faced`, scaled so
    /// the most central bowler of the innings scores 10. Sorted by score,
    /// highest first. Bowlers who never delivered a legal ball are skipped.
    pub fn bowler_centrality(&self) -> OrderedMap<BowlerCentrality> {
        let mut totals = vec![(0u32, 0u32, 0u32); self.bowlers.len()];
        for edges in &self.adjacency {
            for (w, m) in edges {
                let t = &mut totals[*w];
                t.0 += 1;
                t.1 += m.dismissals;
                t.2 += m.balls;
            }
        }

        let raw = |faced: u32, wickets: u32| wickets * CENTRALITY_WICKET_WEIGHT + faced;
        let max_raw = totals
            .iter()
            .filter(|t| t.2 > 0)
            .map(|t| raw(t.0, t.1))
            .max()
            .unwrap_or(0);

        let mut rows: Vec<(usize, BowlerCentrality)> = totals
            .iter()
            .enumerate()
            .filter(|(_, t)| t.2 > 0)
            .map(|(w, &(faced, wickets, balls))| {
                let score = if max_raw == 0 {
                    0.0
                } else {
                    CENTRALITY_SCALE * raw(faced, wickets) as f64 / max_raw as f64
                };
                (
                    w,
                    BowlerCentrality {
                        batters_faced: faced,
                        wickets,
                        balls,
                        centrality_score: round_to(score, 2),
                    },
                )
            })
            .collect();
        rows.sort_by(|a, b| {
            b.1.centrality_score
                .total_cmp(&a.1.centrality_score)
                .then(a.0.cmp(&b.0))
        });
        rows.into_iter()
            .map(|(w, c)| (self.bowlers[w].clone(), c))
            .collect()
    }

    /// Greedy batter → bowler assignment.
    ///
    /// Repeatedly takes the globally cheapest unassigned (batter, bowler) edge
    /// by runs-per-ball and assigns that batter to that bowler. Bowlers may
    /// be assigned to several batters. This is a heuristic; it does not
    /// guarantee a minimum-cost matching. Batters with no faced edges are
    /// omitted.
    pub fn optimal_assignment(&self) -> Vec<Assignment> {
        let mut edges: Vec<(usize, usize, Matchup)> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(b, edges)| {
                edges
                    .iter()
                    .filter(|(_, m)| m.balls > 0)
                    .map(move |(w, m)| (b, *w, *m))
            })
            .collect();
        edges.sort_by(|x, y| {
            x.2.cmp_rate(&y.2)
                .then(y.2.balls.cmp(&x.2.balls))
                .then(x.0.cmp(&y.0))
                .then(x.1.cmp(&y.1))
        });

        let mut assigned = vec![false; self.batters.len()];
        let mut out = Vec::new();
        for (b, w, m) in edges {
            if assigned[b] {
                continue;
            }
            assigned[b] = true;
            out.push(Assignment {
                batter: self.batters[b].clone(),
                bowler: self.bowlers[w].clone(),
                expected_runs_per_ball: round_to(m.runs_per_ball().unwrap_or(0.0), 2),
            });
        }
        out
    }

    /// Every bowler each batter faced, with runs, balls and strike rate.
    pub fn matchup_table(&self) -> OrderedMap<Vec<MatchupLine>> {
        self.batters
            .iter()
            .zip(&self.adjacency)
            .map(|(batter, edges)| {
                let lines = edges
                    .iter()
                    .map(|(w, m)| MatchupLine {
                        bowler: self.bowlers[*w].clone(),
                        runs: m.runs,
                        balls: m.balls,
                        wicket: m.dismissals > 0,
                        sr: round_to(m.runs_per_ball().unwrap_or(0.0) * 100.0, 1),
                    })
                    .collect();
                (batter.clone(), lines)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::tests::{ball, wicket};
    use crate::model::{build_innings, DismissalKind, ExtraKind, Extras, Team};
    use approx::assert_relative_eq;

    fn graph() -> MatchupGraph {
        let mut wide = ball(2, 1, "a", "b", "y", 0);
        wide.extras = Some(Extras {
            kind: ExtraKind::Wide,
            runs: 1,
        });
        let events = vec![
            ball(1, 1, "a", "b", "x", 4),
            ball(1, 2, "a", "b", "x", 0),
            ball(1, 3, "a", "b", "z", 1),
            ball(1, 4, "b", "a", "x", 0),
            wide,
            ball(2, 2, "a", "b", "y", 1),
            ball(2, 3, "b", "a", "y", 6),
            wicket(ball(2, 4, "b", "a", "y", 0), DismissalKind::Caught),
        ];
        MatchupGraph::from_innings(&build_innings(Team::A, &events).unwrap())
    }

    #[test]
    fn edges_aggregate_runs_balls_and_dismissals() {
        let g = graph();
        let e = g.edge("a", "x").unwrap();
        assert_eq!((e.runs, e.balls, e.dismissals), (4, 2, 0));
        let e = g.edge("a", "y").unwrap();
        // wide does not count as a ball faced
        assert_eq!((e.runs, e.balls), (1, 1));
        let e = g.edge("b", "y").unwrap();
        assert_eq!((e.runs, e.balls, e.dismissals), (6, 2, 1));
    }

    #[test]
    fn weakest_and_strongest_per_batter() {
        let g = graph();
        // a: x=2.0, z=1.0, y=1.0
        let weak = g.weakest_bowler_for("a").unwrap();
        assert_eq!(weak.bowler, "x");
        assert_relative_eq!(weak.runs_per_ball, 2.0);
        // z and y tie at 1.0 with one ball each; z was faced first
        let strong = g.strongest_bowler_for("a").unwrap();
        assert_eq!(strong.bowler, "z");
        // b: x=0.0, y=3.0
        assert_eq!(g.strongest_bowler_for("b").unwrap().bowler, "x");
        assert_eq!(g.weakest_bowler_for("b").unwrap().bowler, "y");
    }

    #[test]
    fn tie_prefers_more_balls_faced() {
        let events = vec![
            ball(1, 1, "a", "b", "x", 1),
            ball(1, 2, "a", "b", "y", 1),
            ball(1, 3, "a", "b", "y", 1),
        ];
        let g = MatchupGraph::from_innings(&build_innings(Team::A, &events).unwrap());
        assert_eq!(g.weakest_bowler_for("a").unwrap().bowler, "y");
        assert_eq!(g.strongest_bowler_for("a").unwrap().bowler, "y");
    }

    #[test]
    fn centrality_scaled_and_sorted() {
        let g = graph();
        let c = g.bowler_centrality();
        // y: 2 batters + 1 wicket*2 = 4 (max); x: 2 batters = 2; z: 1 batter = 1
        let keys: Vec<_> = c.keys().collect();
        assert_eq!(keys, vec!["y", "x", "z"]);
        assert_relative_eq!(c.get("y").unwrap().centrality_score, 10.0);
        assert_relative_eq!(c.get("x").unwrap().centrality_score, 5.0);
        assert_relative_eq!(c.get("z").unwrap().centrality_score, 2.5);
        assert_eq!(c.get("y").unwrap().wickets, 1);
    }

    #[test]
    fn greedy_assignment_takes_cheapest_edges_first() {
        let g = graph();
        let plan = g.optimal_assignment();
        // cheapest edge overall: b vs x (0.0)
        assert_eq!(plan[0].batter, "b");
        assert_eq!(plan[0].bowler, "x");
        // a's cheapest: z and y at 1.0 with one ball; z faced first (lower index)
        assert_eq!(plan[1].batter, "a");
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn matchup_table_lists_every_bowler_faced() {
        let g = graph();
        let table = g.matchup_table();
        let a = table.get("a").unwrap();
        assert_eq!(a.len(), 3);
        assert_relative_eq!(a[0].sr, 200.0);
        assert!(table.get("b").unwrap().iter().any(|l| l.wicket));
    }
}
