use crate::api::frontend_asset;
use crate::config::Config;
use crate::dashboard;
use crate::db::{Database, UserRow};
use crate::store::{ChallengeRecord, ChallengeStore};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/dashboard/:username", get(dashboard_view))
        .route(
            "/api/v1/users/:username/habits",
            get(habit_list).post(habit_create),
        )
        .route("/api/v1/users/:username/logs", post(log_create))
        .route(
            "/api/v1/users/:username/challenges",
            get(challenge_list).post(challenge_create),
        )
        .fallback(get(static_assets))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    habit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct HabitCreatePayload {
    name: String,
    emoji: Option<String>,
    color: Option<String>,
    category: Option<String>,
    kind: Option<String>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogCreatePayload {
    habit_id: i64,
    value: Option<Value>,
    recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ChallengeCreatePayload {
    title: String,
    kind: Option<String>,
    opponent: Option<String>,
    end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    api_port: u16,
    db_path: String,
    users: i64,
    habits: i64,
    logs: i64,
    challenges: i64,
}

#[derive(Debug, Serialize)]
struct ChallengesPayload {
    count: usize,
    challenges: Vec<ChallengeRecord>,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let database = Database::open(&state.config.db_path)?;
    let stats = database.stats()?;

    let payload = StatusPayload {
        api_port: state.config.api_port,
        db_path: state.config.db_path.display().to_string(),
        users: stats.users,
        habits: stats.habits,
        logs: stats.logs,
        challenges: stats.challenges,
    };

    Ok(Json(payload))
}

async fn dashboard_view(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<dashboard::Dashboard>> {
    let database = Database::open(&state.config.db_path)?;
    let user = resolve_user(&database, &username)?;

    let filter = query.habit.map(|id| vec![id]);
    let view = dashboard::compose(
        &database,
        &database,
        &database,
        user.id,
        filter.as_deref(),
        Utc::now(),
    )?;

    Ok(Json(view))
}

async fn habit_list(
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Value>> {
    let database = Database::open(&state.config.db_path)?;
    let user = resolve_user(&database, &username)?;
    let habits = database.list_habits(user.id)?;

    Ok(Json(json!({ "count": habits.len(), "habits": habits })))
}

async fn habit_create(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    Json(payload): Json<HabitCreatePayload>,
) -> ApiResult<Json<Value>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Habit name must not be empty".to_string()));
    }

    let database = Database::open(&state.config.db_path)?;
    let user = resolve_user(&database, &username)?;

    // Metadata is stored untrusted; the dashboard normalizes on read.
    let id = database.create_habit(
        user.id,
        payload.name.trim(),
        payload.emoji.as_deref(),
        payload.color.as_deref(),
        payload.category.as_deref(),
        payload.kind.as_deref(),
        payload.unit.as_deref(),
    )?;

    Ok(Json(json!({ "id": id })))
}

async fn log_create(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    Json(payload): Json<LogCreatePayload>,
) -> ApiResult<Json<Value>> {
    let database = Database::open(&state.config.db_path)?;
    let user = resolve_user(&database, &username)?;

    let owned = database
        .list_habits(user.id)?
        .iter()
        .any(|habit| habit.id == payload.habit_id);
    if !owned {
        return Err(ApiError::BadRequest(format!(
            "Unknown habit id: {}",
            payload.habit_id
        )));
    }

    let recorded_at = payload.recorded_at.unwrap_or_else(Utc::now);
    let id = database.create_log(user.id, payload.habit_id, recorded_at, payload.value.as_ref())?;

    Ok(Json(json!({ "id": id })))
}

async fn challenge_list(
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ChallengesPayload>> {
    let database = Database::open(&state.config.db_path)?;
    let user = resolve_user(&database, &username)?;
    let challenges = database.active_for(user.id)?;

    Ok(Json(ChallengesPayload {
        count: challenges.len(),
        challenges,
    }))
}

async fn challenge_create(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    Json(payload): Json<ChallengeCreatePayload>,
) -> ApiResult<Json<Value>> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Challenge title must not be empty".to_string()));
    }

    let database = Database::open(&state.config.db_path)?;
    let owner = resolve_user(&database, &username)?;

    let opponent_id = payload
        .opponent
        .as_deref()
        .map(|opponent| {
            database
                .user_by_username(opponent)?
                .map(|row| row.id)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown opponent: {opponent}")))
        })
        .transpose()?;

    let kind = payload.kind.unwrap_or_else(|| {
        if opponent_id.is_some() { "friend" } else { "personal" }.to_string()
    });

    let id = database.create_challenge(
        payload.title.trim(),
        &kind,
        owner.id,
        opponent_id,
        payload.end_date,
    )?;

    Ok(Json(json!({ "id": id })))
}

async fn static_assets(uri: Uri) -> ApiResult<Response> {
    let path = uri.path();

    match frontend_asset(path) {
        Some((bytes, mime)) => {
            let mut response = Response::new(bytes.into_response().into_body());
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_str(&mime)?);
            Ok(response)
        }
        None => Err(ApiError::NotFound("Static asset not found".to_string())),
    }
}

fn resolve_user(database: &Database, username: &str) -> ApiResult<UserRow> {
    database
        .user_by_username(username)?
        .ok_or_else(|| ApiError::NotFound(format!("Unknown user: {username}")))
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl From<axum::http::header::InvalidHeaderValue> for ApiError {
    fn from(value: axum::http::header::InvalidHeaderValue) -> Self {
        Self::Internal(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        }
    }
}
