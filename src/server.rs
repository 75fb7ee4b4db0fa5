//! Web server exposing the classification engine as a JSON API.
//!
//! Provides endpoints for classification, waist-only risk and the active
//! region tables, plus optional static file serving for a frontend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::chart::BmiChart;
use crate::classify::{ClassificationResult, Classifier, WaistAssessment, assess_waist};
use crate::domain::{HeightInput, Measurement, Sex, WeightInput};
use crate::error::{ClassifyError, ParseError};
use crate::formulas::calculate_bmi;
use crate::thresholds::{Band, RegionTables};

/// Shared application state. Read-only after startup.
pub struct AppState {
    pub classifier: Classifier,
}

// === JSON Request/Response Types ===

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub height: HeightInput,
    pub weight: WeightInput,
    #[serde(default)]
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub hip_cm: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub muscular: bool,
    #[serde(default)]
    pub estimate_body_fat: bool,
}

impl ClassifyRequest {
    /// Resolves string fields to enums and builds the measurement.
    pub fn into_measurement(self) -> Result<Measurement, ParseError> {
        let mut m = Measurement::from_inputs(self.height, self.weight);
        m.waist_cm = self.waist_cm;
        m.hip_cm = self.hip_cm;
        m.age = self.age;
        m.sex = self.sex.as_deref().map(str::parse).transpose()?;
        if let Some(region) = self.region.as_deref() {
            m.region = region.parse()?;
        }
        m.is_muscular = self.muscular;
        m.estimate_body_fat = self.estimate_body_fat;
        Ok(m)
    }
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub result: ClassificationResult,
    pub chart: BmiChart,
}

#[derive(Debug, Deserialize)]
pub struct WaistRiskRequest {
    pub waist_cm: f64,
    #[serde(default)]
    pub sex: Option<String>,
}

#[derive(Serialize)]
pub struct RegionJson {
    pub id: &'static str,
    pub name: &'static str,
    pub bands: Vec<Band>,
}

#[derive(Serialize)]
pub struct ErrorJson {
    pub error: &'static str,
    pub message: String,
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    Parse(ParseError),
    Classify(ClassifyError),
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::Parse(err)
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        ApiError::Classify(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Parse(e) => (StatusCode::BAD_REQUEST, "bad_request", e.to_string()),
            ApiError::Classify(e @ ClassifyError::UnknownRegion(_)) => {
                log::error!("Region table registry is missing an entry: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.kind(), e.to_string())
            }
            ApiError::Classify(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.kind(), e.to_string()),
        };

        log::warn!("Request rejected ({}): {}", status, message);
        (
            status,
            Json(ErrorJson {
                error: kind,
                message,
            }),
        )
            .into_response()
    }
}

/// Classifies a measurement and builds its chart.
///
/// The marker uses the unrounded BMI so that it lands in the same band as
/// the reported category.
pub fn build_response(
    classifier: &Classifier,
    measurement: &Measurement,
) -> Result<ClassifyResponse, ClassifyError> {
    let result = classifier.classify(measurement)?;
    let table = classifier.tables().get(measurement.region)?;
    let bmi = calculate_bmi(measurement.height_cm, measurement.weight_kg)?;
    let chart = BmiChart::build(table, bmi);
    Ok(ClassifyResponse { result, chart })
}

/// Lists registered tables in region order.
pub fn region_list(tables: &RegionTables) -> Vec<RegionJson> {
    tables
        .iter()
        .map(|(region, table)| RegionJson {
            id: region.key(),
            name: region.display_name(),
            bands: table.bands().to_vec(),
        })
        .collect()
}

// === Router Setup ===

/// Creates the application router.
pub fn create_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/regions", get(get_regions))
        .route("/api/classify", post(post_classify))
        .route("/api/waist-risk", post(post_waist_risk));

    let router = match static_dir {
        Some(dir) => {
            router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => router,
    };

    router.with_state(state)
}

/// Runs the web server.
pub async fn run_server(
    state: Arc<AppState>,
    port: u16,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let app = create_router(state, static_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("Server running at http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === API Handlers ===

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/regions - Active threshold tables.
async fn get_regions(State(state): State<Arc<AppState>>) -> Json<Vec<RegionJson>> {
    Json(region_list(state.classifier.tables()))
}

/// POST /api/classify - Full classification with chart.
async fn post_classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let measurement = request.into_measurement()?;
    let response = build_response(&state.classifier, &measurement)?;

    log::info!(
        "Classified BMI {} as {} ({})",
        response.result.bmi,
        response.result.category,
        response.result.region
    );

    Ok(Json(response))
}

/// POST /api/waist-risk - Waist-only assessment for callers without a height.
async fn post_waist_risk(
    Json(request): Json<WaistRiskRequest>,
) -> Result<Json<WaistAssessment>, ApiError> {
    let sex: Option<Sex> = request.sex.as_deref().map(str::parse).transpose()?;
    let assessment = assess_waist(request.waist_cm, sex)?;
    Ok(Json(assessment))
}
