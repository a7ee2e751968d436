//! Authentication middleware for bearer-token validation.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use backoffice_types::BackofficeRepository;

use super::handlers::AppState;

/// Extracts the bearer token from the Authorization header.
/// Expected format: "Bearer <token>" or just "<token>"
fn extract_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    if header.starts_with("Bearer ") {
        Some(header.strip_prefix("Bearer ").unwrap())
    } else {
        Some(header)
    }
}

/// Authentication middleware that resolves staff bearer tokens.
///
/// This middleware:
/// 1. Extracts the token from the Authorization header
/// 2. Hashes it using SHA-256
/// 3. Resolves the active staff account for the hash
/// 4. Injects the resolved `Actor` into request extensions; handlers pass it
///    down to the services explicitly
/// 5. Returns 401 Unauthorized when resolution fails
///
/// Endpoints that bypass authentication:
/// - `/health` - Health check endpoint
/// - `POST /api/bootstrap` - Creates the first admin (only works while no staff exist)
pub async fn auth_middleware<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Skip authentication for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    // Skip authentication for bootstrap endpoint (it has its own protection)
    if request.uri().path() == "/api/bootstrap" && request.method() == axum::http::Method::POST {
        return next.run(request).await;
    }

    // Extract token from Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match extract_token(auth_header) {
        Some(token) if !token.is_empty() => token,
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    // Hash the token
    let token_hash = backoffice_repo::security::hash_token(token);

    // Resolve the staff account
    match state.repo.verify_token_hash(&token_hash).await {
        Ok(Some(employee)) => {
            request.extensions_mut().insert(employee.actor());
            next.run(request).await
        }
        Ok(None) => {
            // Token unknown, or the account was deactivated
            unauthorized_response("Invalid bearer token")
        }
        Err(e) => {
            // Database error
            tracing::error!("token verification failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Internal server error",
                    "code": 500
                })),
            )
                .into_response()
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}
