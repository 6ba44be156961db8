use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use mime_guess::from_path;
use rust_embed::RustEmbed;
use std::path::Path;

#[derive(RustEmbed)]
#[folder = "assets"]
pub struct Assets;

/// Embedded image served when no image path is configured
pub const EMBEDDED_IMAGE: &str = "background.png";

fn file_response(path: &Path, content: Body) -> Response {
    let mime = from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.to_string())],
        content,
    )
        .into_response()
}

/// Serve the configured image file, or the embedded one
pub async fn serve_image(image_path: Option<&str>) -> Response {
    if let Some(path) = image_path {
        match tokio::fs::read(path).await {
            Ok(content) => return file_response(Path::new(path), Body::from(content)),
            Err(e) => {
                tracing::warn!("Failed to read image {}: {}, serving embedded image", path, e);
            }
        }
    }

    serve_embedded(EMBEDDED_IMAGE)
}

/// Serve from embedded assets
pub fn serve_embedded(path: &str) -> Response {
    match Assets::get(path) {
        Some(content) => file_response(Path::new(path), Body::from(content.data)),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}
