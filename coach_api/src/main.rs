use anyhow::Context;
use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json,
};
use lap_delta::{AnalysisConfig, Axis, DomainAnalysis};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod error;
mod store;
mod summary;
mod types;

use crate::error::ApiError;
use crate::store::LapStore;
use crate::types::{AnalyzeRequest, LapStored, PutLap, SummaryOut, SummaryRequest};

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    store: Arc<LapStore>,
}

// ---------- Handlers ----------

async fn put_lap(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PutLap>,
) -> Result<Json<LapStored>, ApiError> {
    let samples = payload.samples.len();
    let (trace, track_length_m) = payload.into_trace()?;
    let replaced = state.store.insert(&id, trace, track_length_m);
    tracing::info!("stored lap {} ({} samples, replaced={})", id, samples, replaced);

    Ok(Json(LapStored { id, samples, replaced }))
}

/// Analysis runs on the blocking pool; a cold lap pair is a few ms of pure CPU.
async fn run_analysis(
    state: &AppState,
    subject_id: String,
    reference_id: Option<String>,
    axis: Axis,
) -> Result<Arc<DomainAnalysis>, ApiError> {
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || store.analyze(&subject_id, reference_id.as_deref(), axis))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<DomainAnalysis>, ApiError> {
    let analysis = run_analysis(&state, req.subject_id, req.reference_id, req.axis).await?;
    tracing::info!(
        "analyzed on {}: {} corners, {} improvement areas",
        analysis.axis.as_str(),
        analysis.corners.len(),
        analysis.improvements.len()
    );
    Ok(Json(DomainAnalysis::clone(&analysis)))
}

async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryOut>, ApiError> {
    let analysis = run_analysis(&state, req.subject_id, req.reference_id, Axis::Distance).await?;
    let summary = summary::session_summary(req.session.as_ref(), &analysis);

    Ok(Json(SummaryOut {
        summary,
        improvements: analysis.improvements.clone(),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = std::env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8080);
    let cfg = match std::env::var("ANALYSIS_CONFIG") {
        Ok(path) => {
            let cfg = AnalysisConfig::load(&path)
                .with_context(|| format!("failed to load analysis config {}", path))?;
            tracing::info!("loaded analysis config from {}", path);
            cfg
        }
        Err(_) => AnalysisConfig::default(),
    };
    tracing::info!(
        "grid {} points, brake threshold {}%",
        cfg.align.target_point_count,
        cfg.corners.brake_threshold_pct
    );

    let state = AppState {
        store: Arc::new(LapStore::new(cfg)),
    };

    let app = axum::Router::new()
        .route("/laps/:id", put(put_lap))
        .route("/analyze", post(analyze))
        .route("/summary", post(summarize))
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
