// Axum API Server Module
//
// Purpose: REST surface over the in-memory school statistics engine.
// Each request is an independent computation against the shared, immutable
// record set; no locking, no per-session state.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use std::sync::Arc;

use crate::aggregation::{StatsEngine, DEFAULT_TOP_SCHOOLS};
use crate::error::QueryError;
use crate::facade::InMemorySchools;
use crate::repository::{parse_limit, ListSchoolsParams, SchoolRepository};
use crate::types::{
    DistrictComparison, DistrictSummary, OverviewStats, SchoolDetail, SchoolPage, TopSchool,
};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub schools: Arc<InMemorySchools>,
}

impl AppState {
    pub fn new(repo: SchoolRepository) -> Self {
        Self {
            schools: Arc::new(InMemorySchools::new(repo)),
        }
    }

    fn engine(&self) -> StatsEngine<'_> {
        StatsEngine::new(self.schools.repository())
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Dashboard + district views
        .route("/api/stats/overview", get(get_overview_stats))
        .route("/api/districts", get(get_districts))
        .route("/api/analysis/district-comparison", get(get_district_comparison))
        .route("/api/analysis/top-schools", get(get_top_schools))

        // School list + detail
        .route("/api/schools", get(list_schools))
        .route("/api/schools/:id", get(get_school_detail))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "schools": state.schools.repository().len(),
    }))
}

async fn get_overview_stats(State(state): State<AppState>) -> Json<OverviewStats> {
    Json(state.engine().overview_stats())
}

async fn get_districts(State(state): State<AppState>) -> Json<Vec<DistrictSummary>> {
    Json(state.engine().district_summaries())
}

async fn get_district_comparison(
    State(state): State<AppState>,
) -> Json<Vec<DistrictComparison>> {
    Json(state.engine().district_comparison())
}

async fn list_schools(
    State(state): State<AppState>,
    Query(params): Query<ListSchoolsParams>,
) -> Json<SchoolPage> {
    tracing::debug!("School listing: {:?}", params);
    let query = params.into_query();
    Json(state.schools.list_schools_now(&query))
}

async fn get_school_detail(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<SchoolDetail>, AppError> {
    tracing::debug!("Fetching school {}", id);
    let detail = state.engine().school_detail(id)?;
    Ok(Json(detail))
}

/// Query params for the top-list
#[derive(Debug, serde::Deserialize)]
struct TopSchoolsQuery {
    limit: Option<String>,
}

async fn get_top_schools(
    State(state): State<AppState>,
    Query(params): Query<TopSchoolsQuery>,
) -> Json<Vec<TopSchool>> {
    let limit = parse_limit(params.limit.as_deref()).unwrap_or(DEFAULT_TOP_SCHOOLS);
    Json(state.engine().top_schools(limit))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound(_) => AppError::NotFound(err.to_string()),
            QueryError::Unavailable(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
