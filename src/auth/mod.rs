use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

/// API-key guard for the admin routes
pub struct AuthService {
    api_keys: Arc<Vec<String>>,
}

impl AuthService {
    /// An empty key list leaves the admin routes open
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            api_keys: Arc::new(api_keys),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    pub fn validate_key(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return true;
        }

        self.api_keys.iter().any(|k| k == key)
    }
}

/// Key from the `X-API-Key` header, or the `key` query parameter for browsers
fn request_key<'a>(headers: &'a HeaderMap, params: &'a HashMap<String, String>) -> &'a str {
    headers
        .get("X-API-Key")
        .and_then(|h| h.to_str().ok())
        .or_else(|| params.get("key").map(String::as_str))
        .unwrap_or("")
}

pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if auth_service.validate_key(request_key(&headers, &params)) {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, "Invalid or missing API key").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_allows_everything() {
        let auth = AuthService::new(vec![]);
        assert!(!auth.is_enabled());
        assert!(auth.validate_key(""));
    }

    #[test]
    fn test_configured_keys() {
        let auth = AuthService::new(vec!["alpha".to_string(), "beta".to_string()]);
        assert!(auth.validate_key("beta"));
        assert!(!auth.validate_key(""));
        assert!(!auth.validate_key("gamma"));
    }

    #[test]
    fn test_request_key_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", "alpha".parse().unwrap());
        let params = HashMap::from([("key".to_string(), "beta".to_string())]);
        assert_eq!(request_key(&headers, &params), "alpha");
    }

    #[test]
    fn test_request_key_missing() {
        assert_eq!(request_key(&HeaderMap::new(), &HashMap::new()), "");
    }
}
