use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chirpid::{ParsedId, SnowflakeGenerator, SnowflakeGeneratorAsyncTokioExt, SnowflakeId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{ApiError, Result};

/// Shared handler state. Cloned per request, so `G` should share its state
/// across clones (as `LockSnowflakeGenerator` does).
#[derive(Clone)]
pub struct AppState<G> {
    generator: G,
}

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub machine_id: u16,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct IdResponse {
    pub id: SnowflakeId,
}

#[derive(Serialize)]
pub struct IdsResponse {
    pub ids: Vec<SnowflakeId>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ParseResponse {
    #[serde(flatten)]
    pub parsed: ParsedId,
    /// Issue time in UTC, `YYYY-MM-DD HH:MM:SS.mmm`.
    pub datetime: String,
}

/// Builds the service router around one process-wide generator.
///
/// CORS is open to any origin, method, and header.
pub fn router<G>(generator: G) -> Router
where
    G: SnowflakeGenerator + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root::<G>))
        .route("/health", get(health))
        .route("/id", get(next_id::<G>))
        .route("/ids/{count}", get(next_ids::<G>))
        .route("/parse/{id}", get(parse_id::<G>))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { generator })
}

async fn root<G>(State(state): State<AppState<G>>) -> Json<RootResponse>
where
    G: SnowflakeGenerator,
{
    Json(RootResponse {
        message: "Snowflake ID Service",
        machine_id: state.generator.machine_id().get(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "serving" })
}

async fn next_id<G>(State(state): State<AppState<G>>) -> Result<Json<IdResponse>>
where
    G: SnowflakeGenerator + Sync,
{
    let id = state.generator.generate_async().await?;
    Ok(Json(IdResponse { id }))
}

async fn next_ids<G>(
    State(state): State<AppState<G>>,
    Path(count): Path<String>,
) -> Result<Json<IdsResponse>>
where
    G: SnowflakeGenerator + Sync,
{
    let count = count.parse::<usize>().map_err(|_| ApiError::BadRequest {
        reason: format!("count {count:?} is not a non-negative integer"),
    })?;
    let ids = state.generator.generate_batch_async(count).await?;
    Ok(Json(IdsResponse {
        count: ids.len(),
        ids,
    }))
}

async fn parse_id<G>(
    State(state): State<AppState<G>>,
    Path(raw): Path<String>,
) -> Result<Json<ParseResponse>>
where
    G: SnowflakeGenerator,
{
    let id: SnowflakeId = raw.parse()?;
    let parsed = state.generator.parse(id.to_raw())?;
    let datetime = format_datetime(parsed.timestamp)?;
    Ok(Json(ParseResponse { parsed, datetime }))
}

fn format_datetime(unix_millis: u64) -> Result<String> {
    i64::try_from(unix_millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .ok_or_else(|| ApiError::Internal {
            context: format!("timestamp {unix_millis}ms is out of range"),
        })
}
