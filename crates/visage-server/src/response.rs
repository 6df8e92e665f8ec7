//! Error-to-response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use visage_search::SearchError;
use visage_vector::VectorError;

/// Wrapper so [`SearchError`] can be returned from handlers.
///
/// Client faults (bad payload, no detectable face) map to 400; an
/// unavailable index maps to 503; everything else is a 500. The specific
/// kind is preserved in the body, never downgraded.
pub struct ApiError(pub SearchError);

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        ApiError(e)
    }
}

fn status_for(err: &SearchError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if matches!(err, SearchError::Vector(VectorError::Unavailable(_))) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&SearchError::NoFaceDetected),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SearchError::InvalidInput("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SearchError::EmbeddingFailed("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&SearchError::Vector(VectorError::Unavailable(
                "down".to_string()
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&SearchError::Vector(VectorError::DimensionMismatch {
                expected: 512,
                actual: 4
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
