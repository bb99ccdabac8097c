//! Property tests for the query invariants.

use std::collections::HashSet;

use cricket_analytics::engine::allocation::{optimize, BowlerRate};
use cricket_analytics::engine::clustering::batter_clusters;
use cricket_analytics::engine::momentum::best_window;
use cricket_analytics::engine::patterns::{duplicate_overs, over_signatures};
use cricket_analytics::engine::range_index::RunsRangeIndex;
use cricket_analytics::engine::win_probability::{win_probability_series, ChaseModel};
use cricket_analytics::model::{
    build_innings, BallEvent, BattingRecord, DismissalKind, ExtraKind, Extras, OverSummary, Wicket,
};
use cricket_analytics::{AnalyticsError, MatchFeed, MatchModel, Team};
use proptest::prelude::*;

fn delivery(over: u32, ball: u32, batter: &str, bowler: &str, runs: u32) -> BallEvent {
    BallEvent {
        innings: 1,
        over,
        ball,
        batter: batter.into(),
        non_striker: "anchor".into(),
        bowler: bowler.into(),
        runs_off_bat: runs,
        extras: None,
        wicket: None,
    }
}

type DeliveryKind = (u32, Option<(ExtraKind, u32)>);

fn delivery_kinds() -> Vec<DeliveryKind> {
    vec![
        (0, None),
        (1, None),
        (4, None),
        (0, Some((ExtraKind::Wide, 1))),
        (0, Some((ExtraKind::Wide, 3))),
        (2, Some((ExtraKind::Wide, 1))),
        (0, Some((ExtraKind::NoBall, 1))),
        (0, Some((ExtraKind::NoBall, 3))),
        (4, Some((ExtraKind::NoBall, 1))),
        (0, Some((ExtraKind::Bye, 1))),
        (1, Some((ExtraKind::Bye, 1))),
        (0, Some((ExtraKind::LegBye, 2))),
    ]
}

fn batting(runs: &[u32]) -> Vec<BattingRecord> {
    runs.iter()
        .enumerate()
        .map(|(i, &r)| {
            let mut rec = BattingRecord::new(format!("p{}", i));
            rec.runs = r;
            rec
        })
        .collect()
}

fn over_summaries(runs: &[u32]) -> Vec<OverSummary> {
    runs.iter()
        .enumerate()
        .map(|(i, &r)| OverSummary {
            over: i as u32 + 1,
            bowler: "x".into(),
            runs: r,
            wickets: 0,
            legal_balls: 6,
        })
        .collect()
}

proptest! {
    #[test]
    fn range_query_is_exact(runs in prop::collection::vec(0u32..150, 0..15), threshold in 0u32..160) {
        let records = batting(&runs);
        let found = RunsRangeIndex::new(&records).at_least(threshold);

        prop_assert!(found.iter().all(|e| e.runs >= threshold));
        prop_assert_eq!(found.len(), runs.iter().filter(|&&r| r >= threshold).count());
        prop_assert!(found.windows(2).all(|w| w[0].runs >= w[1].runs));
    }

    #[test]
    fn clusters_partition_dismissed_batters(
        wickets in prop::collection::vec((0usize..4, any::<bool>(), any::<bool>()), 0..=10)
    ) {
        let bowlers = ["w", "x", "y", "z"];
        let mut events = Vec::new();
        let mut dismissed = HashSet::new();
        for (i, &(bowler, run_out, out)) in wickets.iter().enumerate() {
            let batter = format!("p{}", i);
            let mut ev = delivery(i as u32 / 6 + 1, i as u32 % 6 + 1, &batter, bowlers[bowler], 0);
            if out {
                ev.wicket = Some(Wicket {
                    kind: if run_out { DismissalKind::RunOut } else { DismissalKind::Caught },
                    player_out: batter.clone(),
                    fielder: None,
                });
                dismissed.insert(batter);
            }
            events.push(ev);
        }
        let snap = build_innings(Team::A, &events).unwrap();
        let clusters = batter_clusters(&snap);

        let members: Vec<String> = clusters.values().flatten().cloned().collect();
        let unique: HashSet<String> = members.iter().cloned().collect();
        prop_assert_eq!(members.len(), unique.len());
        prop_assert_eq!(unique, dismissed);
    }

    #[test]
    fn allocation_meets_quota_within_caps(
        rates in prop::collection::vec(3.0f64..15.0, 1..8),
        cap in 1u32..6,
        quota in 0u32..30,
    ) {
        let rates: Vec<BowlerRate> = rates
            .into_iter()
            .enumerate()
            .map(|(i, r)| BowlerRate { bowler: format!("b{}", i), runs_per_over: r })
            .collect();
        match optimize(&rates, quota, cap) {
            Ok(plan) => {
                prop_assert_eq!(plan.total_overs(), quota);
                prop_assert!(plan.allocation.iter().all(|a| a.overs <= cap));
                prop_assert_eq!(plan.allocation.len(), rates.len());
            }
            Err(AnalyticsError::AllocationInfeasible { capacity, .. }) => {
                prop_assert!(capacity < quota);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn chase_probability_is_monotonic(
        par in 5.0f64..11.0,
        needed in 1i64..200,
        balls in 1u32..=120,
        wickets in 1u32..10,
    ) {
        let model = ChaseModel::new(par);
        let p = model.chase_probability(needed, balls, wickets);
        let harder = model.chase_probability(needed + 1, balls, wickets);
        let more_wickets = model.chase_probability(needed, balls, wickets + 1);
        prop_assert!(harder <= p);
        prop_assert!(more_wickets >= p);
        // strict wherever the curve has not saturated in f64
        let open = |x: f64| x > 1e-12 && x < 1.0 - 1e-12;
        if open(p) && open(harder) {
            prop_assert!(harder < p);
        }
        if open(p) && open(more_wickets) {
            prop_assert!(more_wickets > p);
        }
    }

    #[test]
    fn win_probabilities_sum_to_hundred(
        tokens in prop::collection::vec(prop::sample::select(vec!["0", "1", "2", "4", "6", "W", "WD"]), 1..120)
    ) {
        let mut chase = Vec::new();
        let mut wickets = 0;
        for t in tokens {
            if wickets == 10 {
                break;
            }
            if t == "W" {
                wickets += 1;
            }
            chase.push(t);
        }
        let order: Vec<String> = (0..11).map(|i| format!("\"b{}\"", i)).collect();
        let raw = format!(
            r#"{{"teams":{{"teamA":"A","teamB":"B"}},"total_overs":20,"innings":[
                {{"format":"compact","batting_order":["a1","a2"],"over_bowlers":["x"],"deliveries":["4","1","6","0","2","1"]}},
                {{"format":"compact","batting_order":[{}],"over_bowlers":["y","z"],"deliveries":{}}}
            ]}}"#,
            order.join(","),
            serde_json::to_string(&chase).unwrap()
        );
        let model = MatchModel::build(&MatchFeed::from_json(&raw).unwrap()).unwrap();
        let series = win_probability_series(&model, &ChaseModel::new(8.0));
        prop_assert!(!series.is_empty());
        for point in series {
            prop_assert!((point.team_a_win_prob + point.team_b_win_prob - 100.0).abs() < 1e-6);
            prop_assert!((0.0..=100.0).contains(&point.team_b_win_prob));
        }
    }

    #[test]
    fn identical_overs_share_a_duplicate_group(
        overs in prop::collection::vec(prop::collection::vec(prop::sample::select(delivery_kinds()), 6), 1..12)
    ) {
        let events: Vec<BallEvent> = overs
            .iter()
            .enumerate()
            .flat_map(|(o, balls)| {
                balls.iter().enumerate().map(move |(b, &(runs, extras))| {
                    let mut ev = delivery(o as u32 + 1, b as u32 + 1, "p0", "x", runs);
                    ev.extras = extras.map(|(kind, runs)| Extras { kind, runs });
                    ev
                })
            })
            .collect();
        let snap = build_innings(Team::A, &events).unwrap();
        let signatures = over_signatures(&snap);
        let groups = duplicate_overs(&snap);
        let group_of = |over: u32| groups.iter().position(|g| g.overs.contains(&over));

        for (i, (oi, si)) in signatures.iter().enumerate() {
            for (oj, sj) in signatures.iter().skip(i + 1) {
                let same_deliveries = overs[*oi as usize - 1] == overs[*oj as usize - 1];
                prop_assert_eq!(si == sj, same_deliveries);
                if same_deliveries {
                    prop_assert!(group_of(*oi).is_some());
                    prop_assert_eq!(group_of(*oi), group_of(*oj));
                } else if let (Some(gi), Some(gj)) = (group_of(*oi), group_of(*oj)) {
                    prop_assert_ne!(gi, gj);
                }
            }
        }
    }

    #[test]
    fn dominant_middle_overs_win_the_window(runs in prop::collection::vec(0u32..=10, 20)) {
        let mut runs = runs;
        for r in &mut runs[6..12] {
            *r = 20;
        }
        let window = best_window(&over_summaries(&runs), 6).unwrap();
        prop_assert_eq!(window.start_over, 7);
        prop_assert_eq!(window.total_runs, 120);
    }
}

#[test]
fn five_bowlers_capped_at_four_bowl_four_each() {
    let rates: Vec<BowlerRate> = [6.5, 7.2, 7.8, 8.4, 9.1]
        .iter()
        .enumerate()
        .map(|(i, &r)| BowlerRate {
            bowler: format!("b{}", i),
            runs_per_over: r,
        })
        .collect();
    let plan = optimize(&rates, 20, 4).unwrap();
    assert!(plan.allocation.iter().all(|a| a.overs == 4));
}

#[test]
fn forty_five_clears_thirty_but_not_fifty() {
    let index = RunsRangeIndex::new(&batting(&[45, 50, 12]));
    let above_30: Vec<_> = index.at_least(30).into_iter().map(|e| e.player).collect();
    let above_50: Vec<_> = index.at_least(50).into_iter().map(|e| e.player).collect();
    assert!(above_30.contains(&"p0".to_string()));
    assert!(!above_50.contains(&"p0".to_string()));
    assert!(above_30.contains(&"p1".to_string()));
    assert!(above_50.contains(&"p1".to_string()));
}
