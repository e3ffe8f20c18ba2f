// Axum server for the dashboard
//
// Serves the page, static assets, layout bootstrap JSON and the
// recomputation channel: one POST /api/update = one orchestrator turn.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DashboardConfig, ViewSettings};
use crate::data::DashboardData;
use crate::illustration::{IllustrationFetcher, OpenAiImageClient};
use crate::options::SelectOption;
use crate::orchestrator::{Controls, InputId, Orchestrator, OutputUpdate};
use crate::web::handlers::pages;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub default_controls: Controls,
    pub assets_dir: PathBuf,
}

impl AppState {
    /// Load both tables and wire the production image client
    pub async fn new(config: &DashboardConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading datasets...");
        let data = DashboardData::load(&config.yearly_path(), &config.heatmap_path())?;

        if config.image.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; bird images will use the fallback");
        }

        tracing::info!("Initializing illustration fetcher...");
        let provider = Arc::new(OpenAiImageClient::new(config.image.clone())?);
        let fetcher = IllustrationFetcher::new(provider, &config.image);

        Ok(Self::from_parts(
            data,
            config.views.clone(),
            fetcher,
            &config.default_species,
            config.assets_dir.clone(),
        ))
    }

    pub fn from_parts(
        data: DashboardData,
        settings: ViewSettings,
        fetcher: IllustrationFetcher,
        default_species: &str,
        assets_dir: PathBuf,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(Arc::new(data), settings, fetcher));
        let default_controls = orchestrator.default_controls(default_species);
        tracing::info!("Default species: '{}'", default_controls.species);

        Self {
            orchestrator,
            default_controls,
            assets_dir,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.assets_dir);

    Router::new()
        // Dashboard page
        .route("/", get(pages::dashboard_page))

        // Health check
        .route("/health", get(health_check))

        // UI runtime channel (JSON)
        .route("/api/layout", get(get_layout))
        .route("/api/update", post(update_views))

        // Static assets (JS, fallback image)
        .nest_service("/assets", assets)

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, serde::Serialize)]
struct LayoutResponse {
    species_options: Vec<SelectOption<String>>,
    subdivision_options: Vec<SelectOption<String>>,
    default_controls: Controls,
    heatmap_year: i64,
}

async fn get_layout(State(state): State<AppState>) -> Json<LayoutResponse> {
    let data = state.orchestrator.data();
    Json(LayoutResponse {
        species_options: data.species_options.clone(),
        subdivision_options: data.subdivision_options.clone(),
        default_controls: state.default_controls.clone(),
        heatmap_year: state.orchestrator.settings().heatmap_year,
    })
}

#[derive(Debug, serde::Deserialize)]
struct UpdateRequest {
    changed: Vec<InputId>,
    controls: Controls,
}

#[derive(Debug, serde::Serialize)]
struct UpdateResponse {
    updates: Vec<OutputUpdate>,
}

async fn update_views(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    if request.changed.is_empty() {
        return Err(AppError::BadRequest("'changed' must name at least one input".to_string()));
    }

    let start = std::time::Instant::now();
    let updates = state.orchestrator.turn(&request.changed, &request.controls).await;
    tracing::debug!(
        "Turn for {:?} produced {} updates in {:?}",
        request.changed,
        updates.len(),
        start.elapsed()
    );

    Ok(Json(UpdateResponse { updates }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
