use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cobranza_db::repositories::RepositoryError;

/// Wire shape shared by every error response: `{codigo, mensaje}` with a
/// stable `ERROR_<status>` code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub codigo: String,
    pub mensaje: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{0}")]
    BadRequest(String),
    #[error("missing or malformed bearer token")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("internal server error")]
    Store(#[from] RepositoryError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store(ref error) = self {
            // The caller gets a generic message; the detail stays in the logs.
            tracing::error!(
                event_name = "system.request.store_error",
                error = %error,
                "data store failure while handling request"
            );
        }

        let status = self.status();
        let envelope = ErrorEnvelope {
            codigo: format!("ERROR_{}", status.as_u16()),
            mensaje: self.to_string(),
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::ApiError;

    #[test]
    fn statuses_map_to_the_error_taxonomy() {
        assert_eq!(
            ApiError::MissingFields(vec!["customer_id"]).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("customer abc".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
