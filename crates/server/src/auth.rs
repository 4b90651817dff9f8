use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::envelope::ApiError;

/// Presence-of-bearer check only; the token itself is not validated.
pub async fn require_bearer(request: Request, next: Next) -> Response {
    let has_bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "));

    if !has_bearer {
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
