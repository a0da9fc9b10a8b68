//! Thin HTTP surface over the repositories.
//!
//! Handlers own the input validation boundary: coordinate ranges, limit and
//! radius bounds, and non-negative offsets are rejected here with a 400 and
//! never reach the store. Store errors map onto status codes; database
//! failures are logged and redacted.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::db::{self, Pool, StoreError};
use crate::model::{Church, ChurchPatch, ChurchWithDistance, NewChurch};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error body shape: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(StoreError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("church {id} not found"))
            }
            ApiError::Store(StoreError::DuplicateOsmId(id)) => (
                StatusCode::CONFLICT,
                format!("a church with osm id {id} already exists"),
            ),
            ApiError::Store(StoreError::InvalidCoordinate(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Store(StoreError::Database(err)) => {
                error!(?err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database error".into())
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

fn check_limit(limit: i64) -> Result<(), ApiError> {
    if !(1..=1000).contains(&limit) {
        return Err(ApiError::Validation(
            "limit must be between 1 and 1000".into(),
        ));
    }
    Ok(())
}

fn check_skip(skip: i64) -> Result<(), ApiError> {
    if skip < 0 {
        return Err(ApiError::Validation("skip must be non-negative".into()));
    }
    Ok(())
}

fn check_latitude(lat: f64) -> Result<(), ApiError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ApiError::Validation(
            "latitude must be between -90 and 90".into(),
        ));
    }
    Ok(())
}

fn check_longitude(lon: f64) -> Result<(), ApiError> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ApiError::Validation(
            "longitude must be between -180 and 180".into(),
        ));
    }
    Ok(())
}

fn check_radius(radius_km: f64) -> Result<(), ApiError> {
    if !(0.1..=100.0).contains(&radius_km) {
        return Err(ApiError::Validation(
            "radius must be between 0.1 and 100 km".into(),
        ));
    }
    Ok(())
}

/// Build the application router. CORS origins come from configuration;
/// unparseable entries are logged and dropped.
pub fn router(pool: Pool, cors_allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/churches", get(list_churches).post(create_church))
        .route("/churches/search/text", get(search_text))
        .route("/churches/search/nearby", get(search_nearby))
        .route(
            "/churches/{id}",
            get(get_church).put(update_church).delete(delete_church),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Church Location Search API" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_list_limit")]
    limit: i64,
}

fn default_list_limit() -> i64 {
    100
}

async fn list_churches(
    State(pool): State<Pool>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Church>>, ApiError> {
    check_skip(q.skip)?;
    check_limit(q.limit)?;
    Ok(Json(db::list_churches(&pool, q.skip, q.limit).await?))
}

async fn get_church(
    State(pool): State<Pool>,
    Path(id): Path<i64>,
) -> Result<Json<Church>, ApiError> {
    Ok(Json(db::get_church(&pool, id).await?))
}

async fn create_church(
    State(pool): State<Pool>,
    Json(body): Json<NewChurch>,
) -> Result<Json<Church>, ApiError> {
    check_latitude(body.latitude)?;
    check_longitude(body.longitude)?;
    Ok(Json(db::create_church(&pool, &body).await?))
}

async fn update_church(
    State(pool): State<Pool>,
    Path(id): Path<i64>,
    Json(patch): Json<ChurchPatch>,
) -> Result<Json<Church>, ApiError> {
    if let Some(lat) = patch.latitude {
        check_latitude(lat)?;
    }
    if let Some(lon) = patch.longitude {
        check_longitude(lon)?;
    }
    Ok(Json(db::update_church(&pool, id, &patch).await?))
}

#[derive(Debug, Serialize)]
struct DeleteReply {
    message: &'static str,
}

async fn delete_church(
    State(pool): State<Pool>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteReply>, ApiError> {
    if !db::delete_church(&pool, id).await? {
        return Err(ApiError::Store(StoreError::NotFound(id)));
    }
    Ok(Json(DeleteReply {
        message: "Church deleted successfully",
    }))
}

#[derive(Debug, Deserialize)]
struct TextSearchQuery {
    q: String,
    #[serde(default = "default_search_limit")]
    limit: i64,
}

fn default_search_limit() -> i64 {
    50
}

async fn search_text(
    State(pool): State<Pool>,
    Query(q): Query<TextSearchQuery>,
) -> Result<Json<Vec<Church>>, ApiError> {
    check_limit(q.limit)?;
    Ok(Json(db::search_churches(&pool, &q.q, q.limit).await?))
}

#[derive(Debug, Deserialize)]
struct NearbyQuery {
    lat: f64,
    lng: f64,
    #[serde(default = "default_radius_km")]
    radius: f64,
    #[serde(default = "default_search_limit")]
    limit: i64,
}

fn default_radius_km() -> f64 {
    10.0
}

async fn search_nearby(
    State(pool): State<Pool>,
    Query(q): Query<NearbyQuery>,
) -> Result<Json<Vec<ChurchWithDistance>>, ApiError> {
    check_latitude(q.lat)?;
    check_longitude(q.lng)?;
    check_radius(q.radius)?;
    check_limit(q.limit)?;
    Ok(Json(
        db::find_nearby_churches(&pool, q.lat, q.lng, q.radius, q.limit).await?,
    ))
}
