use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::AnalyticsError;
use crate::model::Team;
use crate::report::{AnalyticsEngine, QueryKind, QueryParams};

#[derive(Clone)]
pub struct AppState {
    pub engine: AnalyticsEngine,
}

/// Build the Axum router for the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/report", get(report_handler))
        .route("/api/cache", get(cache_handler))
        .route("/api/search", get(search_handler))
        .route("/api/win-probability", get(win_probability_handler))
        .route("/api/teams/:team/:query", get(team_query_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_status(err: &AnalyticsError) -> StatusCode {
    match err {
        AnalyticsError::AllocationInfeasible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /api/health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/report
async fn report_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.report().clone())
}

/// GET /api/cache
async fn cache_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .engine
        .cache_stats()
        .map(Json)
        .map_err(|e| (error_status(&e), e.to_string()))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    prefix: String,
}

/// GET /api/search?prefix=sh
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .engine
        .search_players(&params.prefix)
        .map(Json)
        .map_err(|e| (error_status(&e), e.to_string()))
}

/// GET /api/win-probability
async fn win_probability_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    run(&state, Team::B, QueryKind::WinProbability, QueryParams::default())
}

/// GET /api/teams/:team/:query?threshold=50&prefix=sh
async fn team_query_handler(
    State(state): State<AppState>,
    Path((team, query)): Path<(String, String)>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let team = Team::parse(&team)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown team {:?}", team)))?;
    let kind = QueryKind::parse(&query)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown query {:?}", query)))?;
    run(&state, team, kind, params)
}

fn run(
    state: &AppState,
    team: Team,
    kind: QueryKind,
    params: QueryParams,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.engine.query(team, kind, params) {
        Ok(Some(value)) => Ok(Json((*value).clone())),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            format!("{} has no result for {}", kind.as_str(), team.key()),
        )),
        Err(e) => Err((error_status(&e), e.to_string())),
    }
}
