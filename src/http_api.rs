use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::engine::QueryEngine;
use crate::error::{ErrorPayload, QueryError};

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: QueryEngine,
    pub source: String,
    pub loaded_at: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingParameter(String),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("background query failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match &self {
            ApiError::MissingParameter(message) => (
                StatusCode::BAD_REQUEST,
                ErrorPayload {
                    error: "missing_parameter".to_string(),
                    message: message.clone(),
                },
            ),
            ApiError::Query(err) => {
                let status = match err {
                    QueryError::NotFound(_) => StatusCode::NOT_FOUND,
                    QueryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                };
                (status, err.payload())
            }
            ApiError::Task(err) => {
                tracing::error!("blocking query task failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorPayload {
                        error: "internal".to_string(),
                        message: "query could not be completed".to_string(),
                    },
                )
            }
        };
        tracing::debug!(status = status.as_u16(), error = %payload.error, "{}", payload.message);
        (status, Json(payload)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Query-string parameters. Everything arrives as text and is validated per endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Params {
    pub match_id: Option<String>,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub batsman: Option<String>,
    pub bowler: Option<String>,
    pub phase: Option<String>,
    pub role: Option<String>,
    pub home_venue: Option<String>,
}

impl Params {
    fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::MissingParameter(format!("{name} is required")))
    }

    fn match_id(&self) -> Result<i64, ApiError> {
        Self::required(&self.match_id, "match_id")?
            .parse::<i64>()
            .map_err(|_| {
                ApiError::MissingParameter(
                    "match_id is required and must be an integer".to_string(),
                )
            })
    }
}

#[derive(Debug, Serialize)]
struct Welcome {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    source: String,
    loaded_at: String,
    matches: usize,
    deliveries: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/teams", get(teams))
        .route("/matches/total_per_season", get(matches_per_season))
        .route("/matches/hosted_by_city", get(matches_per_city))
        .route("/matches/average_target_per_season", get(avg_target_per_season))
        .route("/matches/result_distribution", get(result_distribution))
        .route("/matches/result_margin_distribution", get(result_margin_distribution))
        .route("/matches/toss_decision_outcomes", get(toss_decision_outcomes))
        .route("/player/performance", get(player_performance))
        .route("/player/performance_vs_team", get(player_vs_team))
        .route("/player/batsman_vs_bowler", get(batsman_vs_bowler))
        .route("/player/dismissals", get(player_dismissals))
        .route("/player/performance_by_phase", get(player_performance_by_phase))
        .route("/team/phase_stats", get(team_phase_stats))
        .route("/team/home_vs_away", get(team_home_vs_away))
        .route("/match/innings/phases", get(innings_phases))
        .route("/match/innings/top_performers", get(innings_top_performers))
        .route("/match/innings/boundaries", get(innings_boundaries))
        .route("/match/innings/fall_of_wickets", get(innings_fall_of_wickets))
        .route("/match/innings/partnerships", get(innings_partnerships))
        .route("/partnerships", get(all_partnerships))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> impl IntoResponse {
    Json(Welcome {
        message: "Welcome to IPL Analytics API",
    })
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let tables = state.engine.tables();
    Json(Health {
        status: "ok",
        source: state.source.clone(),
        loaded_at: state.loaded_at.clone(),
        matches: tables.matches().len(),
        deliveries: tables.deliveries().len(),
    })
}

async fn teams(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.list_teams())
}

async fn matches_per_season(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.matches_per_season())
}

async fn matches_per_city(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.matches_per_city())
}

async fn avg_target_per_season(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.avg_target_per_season())
}

async fn result_distribution(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.match_result_distribution())
}

async fn result_margin_distribution(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.result_margin_distribution())
}

async fn toss_decision_outcomes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.toss_decision_outcomes())
}

async fn player_performance(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let player = Params::required(&params.player_name, "player_name")?;
    Ok(Json(state.engine.player_performance(player)?))
}

async fn player_vs_team(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let player = Params::required(&params.player_name, "player_name")?;
    let team = Params::required(&params.team_name, "team_name")?;
    Ok(Json(state.engine.player_vs_team(player, team)?))
}

async fn batsman_vs_bowler(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let batsman = Params::required(&params.batsman, "batsman")?;
    let bowler = Params::required(&params.bowler, "bowler")?;
    Ok(Json(state.engine.batsman_vs_bowler(batsman, bowler)?))
}

async fn player_dismissals(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let player = Params::required(&params.player_name, "player_name")?;
    Ok(Json(state.engine.player_dismissal_analysis(player)?))
}

async fn player_performance_by_phase(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let player = Params::required(&params.player_name, "player_name")?;
    let phase = Params::required(&params.phase, "phase")?;
    Ok(Json(state.engine.player_performance_by_phase(player, phase)?))
}

async fn team_phase_stats(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let team = Params::required(&params.team_name, "team_name")?;
    let phase = Params::required(&params.phase, "phase")?;
    let role = params
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("batting");
    Ok(Json(state.engine.team_phase_stats(team, phase, role)?))
}

async fn team_home_vs_away(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    let team = Params::required(&params.team_name, "team_name")?;
    let venue = Params::required(&params.home_venue, "home_venue")?;
    Ok(Json(state.engine.team_home_vs_away(team, venue)))
}

async fn innings_phases(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    Ok(Json(state.engine.innings_phases(params.match_id()?)?))
}

async fn innings_top_performers(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    Ok(Json(state.engine.innings_top_performers(params.match_id()?)?))
}

async fn innings_boundaries(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    Ok(Json(state.engine.innings_boundaries(params.match_id()?)?))
}

async fn innings_fall_of_wickets(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    Ok(Json(state.engine.innings_fall_of_wickets(params.match_id()?)?))
}

async fn innings_partnerships(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<impl Serialize> {
    Ok(Json(state.engine.innings_partnerships(params.match_id()?)?))
}

// The scan covers every delivery and fans out on rayon, so keep it off the async workers.
async fn all_partnerships(State(state): State<AppState>) -> ApiResult<impl Serialize> {
    let engine = state.engine.clone();
    let rows = tokio::task::spawn_blocking(move || engine.all_partnerships()).await?;
    Ok(Json(rows))
}
