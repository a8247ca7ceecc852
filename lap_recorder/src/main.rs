mod config;
mod report;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use lap_delta::{analyze_laps, CompletedLap, LapRecorder, TelemetryFrame};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing_subscriber::EnvFilter;

use crate::config::RecorderSettings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match config::resolve_config_path() {
        Some(path) => {
            tracing::info!("loading recorder config from {}", path.display());
            RecorderSettings::load(&path)?
        }
        None => {
            tracing::info!("no recorder config found, using defaults");
            RecorderSettings::default()
        }
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8765".to_string());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind TCP listener at {}", bind_addr))?;
    tracing::info!("lap recorder listening on ws://{}", bind_addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!("bridge connected from {}", peer);
                tokio::spawn(handle_connection(stream, settings.clone()));
            }
            Err(e) => {
                tracing::warn!("accept error: {}", e);
                // small delay to avoid tight loop in case of persistent errors
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, settings: RecorderSettings) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("websocket handshake failed: {}", e);
            return;
        }
    };
    let (_, mut read) = ws_stream.split();

    // One recorder per bridge connection; the session best resets with it
    let mut recorder = LapRecorder::new(settings.recorder.clone());

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("websocket read error: {}", e);
                break;
            }
        };
        if !msg.is_text() {
            continue;
        }
        let frame = match serde_json::from_str::<TelemetryFrame>(&msg.to_string()) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!("skipping malformed frame: {}", e);
                continue;
            }
        };

        if let Some(lap) = recorder.push(&frame) {
            analyse_lap(&lap, &settings, frame.track_length);
        }
    }

    tracing::info!("bridge disconnected");
}

fn analyse_lap(lap: &CompletedLap, settings: &RecorderSettings, track_length_m: f64) {
    let cfg = settings.analysis_for(track_length_m);
    let analysis = match analyze_laps(&lap.trace, lap.reference.as_ref(), &cfg) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!("lap {} not analysed: {}", lap.lap_number, e);
            return;
        }
    };

    let rep = report::lap_report(lap, &analysis, settings.top_improvements);
    tracing::info!(
        "[ lap {} ] time={:.3}s  delta={}  corners={}  STATUS={}",
        rep.lap_number,
        rep.lap_time_s,
        rep.delta_to_best_s
            .map(|d| format!("{:+.3}s", d))
            .unwrap_or_else(|| "-".to_string()),
        analysis.by_distance.corners.len(),
        rep.status
    );
    for area in rep.top {
        tracing::info!(
            "    {:>6.0}-{:<6.0}m  {:<12} +{:.2}s  {}",
            area.start_value,
            area.end_value,
            area.kind.as_str(),
            area.gain_potential_s,
            area.description
        );
    }
}
