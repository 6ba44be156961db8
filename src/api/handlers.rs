use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::{extract_client_ip, VisitRecorder};
use crate::config::TrustedProxyMode;
use crate::storage::VisitStore;

use super::admin::{render_admin_page, AdminReport};
use super::static_files;

pub struct AppState {
    pub store: Arc<dyn VisitStore>,
    pub recorder: Arc<VisitRecorder>,
    pub trusted_proxy_mode: TrustedProxyMode,
    /// Image served on the tracked route; embedded image when None
    pub image_path: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Landing page
pub async fn index() -> Response {
    static_files::serve_embedded("index.html")
}

/// Record the visit, then serve the image.
///
/// A storage failure is logged and the image is served anyway.
pub async fn background_image(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let client_ip = extract_client_ip(&headers, addr.ip(), state.trusted_proxy_mode);

    if let Err(err) = state.recorder.record(&client_ip).await {
        tracing::error!(ip = %client_ip, error = %err, "failed to record visit");
    }

    static_files::serve_image(state.image_path.as_deref()).await
}

/// Admin report as HTML
pub async fn admin_panel(State(state): State<Arc<AppState>>) -> Response {
    match AdminReport::load(state.store.as_ref()).await {
        Ok(report) => Html(render_admin_page(&report)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load visits: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load visits").into_response()
        }
    }
}

/// Admin report as JSON
pub async fn admin_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminReport>, (StatusCode, Json<ErrorResponse>)> {
    match AdminReport::load(state.store.as_ref()).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!("Failed to load visits: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to load visits: {}", e),
                }),
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
