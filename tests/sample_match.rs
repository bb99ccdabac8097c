//! End-to-end checks over the bundled sample match (Pakistan bat first,
//! India chase 147).

use std::path::PathBuf;

use approx::assert_relative_eq;
use cricket_analytics::report::{QueryKind, QueryParams, TeamView};
use cricket_analytics::{AnalysisSettings, AnalyticsEngine, MatchFeed, MatchModel, MatchReport, Team};

fn sample_model() -> MatchModel {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_match.json");
    let feed = MatchFeed::load(&path).unwrap();
    MatchModel::build(&feed).unwrap()
}

fn names<T>(rows: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    rows.iter().map(|r| name(r).to_string()).collect()
}

#[test]
fn innings_totals() {
    let model = sample_model();
    let a = model.innings_batted_by(Team::A);
    assert_eq!((a.score, a.wickets, a.legal_balls), (146, 10, 115));
    assert_eq!(a.overs_notation(), "19.1");
    let b = model.innings_batted_by(Team::B);
    assert_eq!((b.score, b.wickets, b.legal_balls), (150, 5, 118));
    assert_eq!(model.target(), 147);

    let farhan = a.batting_record("Sahibzada Farhan").unwrap();
    assert_eq!((farhan.runs, farhan.balls), (57, 38));
    let tilak = b.batting_record("Tilak Varma").unwrap();
    assert_eq!((tilak.runs, tilak.balls), (69, 53));
    assert!(!tilak.dismissed);
}

#[test]
fn best_powerplay_windows() {
    let model = sample_model();
    let settings = AnalysisSettings::default();
    let pak = TeamView::new(&model, &settings, Team::A).best_powerplay().unwrap();
    assert_eq!((pak.start_over, pak.end_over, pak.total_runs), (7, 12, 62));
    let ind = TeamView::new(&model, &settings, Team::B).best_powerplay().unwrap();
    assert_eq!((ind.start_over, ind.end_over, ind.total_runs), (15, 20, 67));

    let rolling = TeamView::new(&model, &settings, Team::A).rolling_run_rate();
    assert_eq!(rolling.len(), 15);
    assert_eq!(rolling[0].over, 6);
    // overs 1-6: 4+7+8+13+5+8 = 45
    assert_relative_eq!(rolling[0].run_rate, 7.5);
}

#[test]
fn run_thresholds_are_inclusive() {
    let model = sample_model();
    let settings = AnalysisSettings::default();
    let pak = TeamView::new(&model, &settings, Team::A);
    assert_eq!(
        names(&pak.batters_above(30), |e| &e.player),
        vec!["Sahibzada Farhan", "Fakhar Zaman"]
    );
    assert_eq!(names(&pak.batters_above(50), |e| &e.player), vec!["Sahibzada Farhan"]);
    let ind = TeamView::new(&model, &settings, Team::B);
    assert_eq!(names(&ind.batters_above(30), |e| &e.player), vec!["Tilak Varma", "Shivam Dube"]);
    assert!(ind.batters_above(70).is_empty());
}

#[test]
fn allocation_leaves_out_the_most_expensive_bowler() {
    let model = sample_model();
    let settings = AnalysisSettings::default();

    // India bowled the first innings
    let plan = TeamView::new(&model, &settings, Team::B).optimal_bowling_allocation().unwrap();
    assert_eq!(plan.total_overs(), 20);
    for entry in &plan.allocation {
        let expected = if entry.bowler == "Tilak Varma" { 0 } else { 4 };
        assert_eq!(entry.overs, expected, "{}", entry.bowler);
    }
    assert_relative_eq!(plan.min_expected_runs, 151.8);

    let plan = TeamView::new(&model, &settings, Team::A).optimal_bowling_allocation().unwrap();
    let rauf = plan.allocation.iter().find(|a| a.bowler == "Haris Rauf").unwrap();
    assert_eq!(rauf.overs, 0);
    assert_relative_eq!(plan.min_expected_runs, 123.3);
}

#[test]
fn recommender_picks_cheapest_bowler_with_overs_left() {
    let model = sample_model();
    let settings = AnalysisSettings::default();
    let pak = TeamView::new(&model, &settings, Team::A).next_bowler_recommendation().unwrap();
    assert_eq!(pak.name, "Saim Ayub");
    assert_relative_eq!(pak.economy, 5.33);
    assert_eq!(pak.overs_left, 1);
    let ind = TeamView::new(&model, &settings, Team::B).next_bowler_recommendation().unwrap();
    assert_eq!(ind.name, "Shivam Dube");
    assert_eq!(ind.overs_left, 1);
}

#[test]
fn clusters_cover_every_dismissal() {
    let model = sample_model();
    let settings = AnalysisSettings::default();
    let clusters = TeamView::new(&model, &settings, Team::A).batter_clusters();
    let members: usize = clusters.values().map(Vec::len).sum();
    assert_eq!(members, 10);
    assert_eq!(clusters.get("Dismissed by Kuldeep Yadav").map(Vec::len), Some(4));
    let ind: usize = TeamView::new(&model, &settings, Team::B)
        .batter_clusters()
        .values()
        .map(Vec::len)
        .sum();
    assert_eq!(ind, 5);
}

#[test]
fn squad_search_is_alphabetical() {
    let model = sample_model();
    let settings = AnalysisSettings::default();
    let ind = TeamView::new(&model, &settings, Team::B).player_search();
    assert_eq!(
        ind.get("search_sh").unwrap(),
        &vec!["Shivam Dube".to_string(), "Shubman Gill".to_string()]
    );
    assert!(ind.get("search_mo").unwrap().is_empty());
    let pak = TeamView::new(&model, &settings, Team::A).player_search();
    assert_eq!(
        pak.get("search_mo").unwrap(),
        &vec!["Mohammad Haris".to_string(), "Mohammad Nawaz".to_string()]
    );
}

#[test]
fn win_probability_tracks_the_chase() {
    let model = sample_model();
    let report = MatchReport::build(&model, &AnalysisSettings::default());
    let series = report.win_probability.as_ref().unwrap();
    assert_eq!(series.len(), 20);
    for point in series {
        assert_relative_eq!(point.team_a_win_prob + point.team_b_win_prob, 100.0, epsilon = 1e-6);
    }
    let last = series.last().unwrap();
    assert_eq!((last.team_b_score, last.team_b_wickets), (150, 5));
    assert_relative_eq!(last.team_b_win_prob, 100.0);
    // three quick wickets early swing it toward the defending side
    assert!(series[3].team_b_win_prob < series[0].team_b_win_prob);
}

#[test]
fn report_serializes_contract_keys() {
    let engine = AnalyticsEngine::new(sample_model(), AnalysisSettings::default());
    let json = serde_json::to_value(engine.report()).unwrap();
    for key in [
        "batting_leaderboard",
        "bowling_leaderboard",
        "weakest_bowler_matchups",
        "strongest_bowler_matchups",
        "bowler_centrality",
        "optimal_assignment",
        "best_powerplay",
        "rolling_run_rate",
        "batters_above_30",
        "batters_above_50",
        "player_search",
        "optimal_bowling_allocation",
        "scoring_patterns",
        "duplicate_overs",
        "batter_clusters",
        "next_bowler_recommendation",
        "win_probability",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["best_powerplay"]["teamA"]["start_over"], 7);
    assert!(json["win_probability"][0].get("teamBWinProb").is_some());

    let first = json["bowler_centrality"]["teamB"]
        .as_object()
        .unwrap()
        .values()
        .next()
        .unwrap()
        .clone();
    assert_eq!(first["centrality_score"], 10.0);
}

#[test]
fn engine_queries_are_memoised() {
    let engine = AnalyticsEngine::new(sample_model(), AnalysisSettings::default());
    let params = QueryParams {
        threshold: Some(50),
        prefix: None,
    };
    let first = engine.query(Team::A, QueryKind::BattersAbove, params.clone()).unwrap().unwrap();
    let again = engine.query(Team::A, QueryKind::BattersAbove, params).unwrap().unwrap();
    assert_eq!(first, again);
    assert_eq!(first[0]["player"], "Sahibzada Farhan");
    let stats = engine.cache_stats().unwrap();
    assert_eq!((stats.hits, stats.misses), (1, 1));

    let names = engine.search_players("SH").unwrap();
    assert_eq!(names, vec!["Shaheen Afridi", "Shivam Dube", "Shubman Gill"]);
}

#[test]
fn engine_queries_keep_ranked_order() {
    let engine = AnalyticsEngine::new(sample_model(), AnalysisSettings::default());
    let value = engine
        .query(Team::B, QueryKind::BowlerCentrality, QueryParams::default())
        .unwrap()
        .unwrap();
    let scores: Vec<f64> = value
        .as_object()
        .unwrap()
        .values()
        .map(|v| v["centrality_score"].as_f64().unwrap())
        .collect();
    assert!(scores.len() > 1);
    assert_relative_eq!(scores[0], 10.0);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}
