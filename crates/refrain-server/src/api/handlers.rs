//! API endpoint handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use refrain_core::{
    render_line, ChunkProgress, ChunkRef, FadeLevel, LinePlan, NewChunk, ProgressStore, Rating,
    ReviewOutcome, SessionSummary,
};

use super::error::{ApiError, ApiResult};
use super::extract::UserId;
use super::state::AppState;

/// Default and maximum number of history rows returned
const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

// ============================================================================
// REQUEST BODIES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub chunk_id: String,
    #[serde(alias = "rating")]
    pub self_rating: String,
}

impl ReviewRequest {
    /// Ratings arrive as text so unknown values surface as validation errors.
    fn parse(&self) -> Result<(String, Rating), ApiError> {
        if self.chunk_id.trim().is_empty() {
            return Err(ApiError::validation("chunkId must not be empty"));
        }
        let rating: Rating = self.self_rating.parse()?;
        Ok((self.chunk_id.clone(), rating))
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub reviews: Vec<ReviewRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub chunk_id: Option<String>,
    pub song_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanParams {
    pub level: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub chunk_id: Option<String>,
    pub limit: Option<usize>,
}

// ============================================================================
// RESPONSE VIEWS
// ============================================================================

/// One lyric line with its concealment plan and a plain-text rendering
#[derive(Debug, Serialize)]
pub struct LineView {
    pub words: Vec<String>,
    pub plan: LinePlan,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeItem {
    pub chunk_id: String,
    pub song_id: String,
    pub label: String,
    pub position: u32,
    pub progress: ChunkProgress,
    pub lines: Vec<LineView>,
}

fn line_views(chunk: &ChunkRef, plans: Vec<LinePlan>) -> Vec<LineView> {
    chunk
        .lines
        .iter()
        .zip(plans)
        .map(|(words, plan)| LineView {
            text: render_line(words.as_slice(), &plan),
            words: words.clone(),
            plan,
        })
        .collect()
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Health check
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match state.storage.get_chunk("__health__") {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };
    Json(serde_json::json!({
        "status": if database == "ok" { "healthy" } else { "degraded" },
        "database": database,
        "version": refrain_core::VERSION,
    }))
}

/// Due queue with fade plans at each chunk's stored level
pub async fn get_practice(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> ApiResult<Json<Value>> {
    let orchestrator = &state.orchestrator;
    let queue = orchestrator.due_queue(&user_id, Utc::now())?;

    let items: Vec<PracticeItem> = queue
        .into_iter()
        .map(|due| {
            let plans = orchestrator.plan_for(&due);
            PracticeItem {
                lines: line_views(&due.chunk, plans),
                chunk_id: due.chunk.id,
                song_id: due.chunk.song_id,
                label: due.chunk.label,
                position: due.chunk.position,
                progress: due.progress,
            }
        })
        .collect();

    Ok(Json(serde_json::json!({
        "userId": user_id,
        "due": items.len(),
        "items": items,
    })))
}

/// Submit one self-rating
pub async fn submit_review(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewOutcome>> {
    let Json(request) = payload?;
    let (chunk_id, rating) = request.parse()?;

    let outcome = state
        .orchestrator
        .submit_review(&user_id, &chunk_id, rating, Utc::now())?;

    Ok(Json(outcome))
}

/// Submit a whole session. Invalid ratings reject the batch before anything
/// is written; store failures are reported per chunk in the summary.
pub async fn submit_batch(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<Json<SessionSummary>> {
    let Json(request) = payload?;
    if request.reviews.is_empty() {
        return Err(ApiError::validation("Batch contains no reviews"));
    }
    let reviews = request
        .reviews
        .iter()
        .map(ReviewRequest::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let summary = state.orchestrator.record_batch(&user_id, reviews, Utc::now());

    Ok(Json(summary))
}

/// All progress rows for the caller, with totals
pub async fn list_progress(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> ApiResult<Json<Value>> {
    let now = Utc::now();
    let items = state.storage.list_progress(&user_id)?;
    let stats = state.storage.user_stats(&user_id, now)?;

    Ok(Json(serde_json::json!({
        "userId": user_id,
        "total": items.len(),
        "items": items,
        "stats": stats,
    })))
}

/// One progress row plus the outcome each rating would have right now
pub async fn get_progress(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(chunk_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let now = Utc::now();
    let (progress, preview) = state.orchestrator.preview(&user_id, &chunk_id, now)?;
    let is_due = state.orchestrator.scheduler().is_due(&progress, now);

    Ok(Json(serde_json::json!({
        "progress": progress,
        "isDue": is_due,
        "preview": preview,
    })))
}

/// Fade plan for a chunk at an explicit level
pub async fn get_plan(
    State(state): State<AppState>,
    Path(chunk_id): Path<String>,
    params: Result<Query<PlanParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let raw = params.level.unwrap_or(0);
    let level = u8::try_from(raw)
        .map_err(|_| ApiError::validation(format!("Fade level must be between 0 and 5, got {}", raw)))
        .and_then(|n| FadeLevel::new(n).map_err(ApiError::from))?;

    let chunk = state
        .storage
        .get_chunk(&chunk_id)?
        .ok_or_else(|| ApiError(refrain_core::Error::NotFound(format!("chunk {}", chunk_id))))?;
    let plans = state.orchestrator.fade_engine().plan_chunk(&chunk, level);

    Ok(Json(serde_json::json!({
        "chunkId": chunk.id,
        "label": chunk.label,
        "level": level,
        "lines": line_views(&chunk, plans),
    })))
}

/// Register (or update) a lyric chunk
pub async fn register_chunk(
    State(state): State<AppState>,
    payload: Result<Json<NewChunk>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ChunkRef>)> {
    let Json(new_chunk) = payload?;
    let chunk = new_chunk.into_chunk();
    state.storage.register_chunk(&chunk)?;
    Ok((StatusCode::CREATED, Json(chunk)))
}

/// Give the caller default progress on a chunk or on every chunk of a song
pub async fn create_assignment(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<AssignmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(request) = payload?;
    let now = Utc::now();

    let assigned = match (request.chunk_id, request.song_id) {
        (Some(chunk_id), None) => vec![state.storage.assign_chunk(&user_id, &chunk_id, now)?],
        (None, Some(song_id)) => state.storage.assign_song(&user_id, &song_id, now)?,
        _ => {
            return Err(ApiError::validation(
                "Provide exactly one of chunkId or songId",
            ));
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "userId": user_id,
            "assigned": assigned,
        })),
    ))
}

/// Review log, newest first
pub async fn review_history(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let entries = state
        .storage
        .review_history(&user_id, params.chunk_id.as_deref(), limit)?;

    Ok(Json(serde_json::json!({
        "userId": user_id,
        "total": entries.len(),
        "entries": entries,
    })))
}
