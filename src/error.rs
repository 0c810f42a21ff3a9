use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

pub const NOTHING_FOUND: &str = "Did not find anything";
pub const NO_STOPS_MATCHED: &str = "No stops matched the search";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The transit API failed, timed out or answered with something unreadable
    #[error("{0}")]
    UpstreamFailure(String),

    /// The request was fine but there is nothing to show
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return ApiError::UpstreamFailure("The transit API timed out".to_string());
        }

        ApiError::UpstreamFailure(value.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::UpstreamFailure(format!("Unexpected response from the transit API: {value}"))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::UpstreamFailure(_) => error!("{self}"),
            ApiError::NotFound(_) | ApiError::BadRequest(_) => warn!("{self}"),
        }

        let body = ErrorBody {
            status: status.as_u16(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use super::ApiError;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, body) = render(ApiError::NotFound(super::NOTHING_FOUND.to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"status": 404, "message": "Did not find anything"}));
    }

    #[tokio::test]
    async fn test_upstream_failure_envelope() {
        let (status, body) = render(ApiError::UpstreamFailure("Invalid token".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_bad_request_envelope() {
        let (status, body) = render(ApiError::BadRequest("missing id".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[test]
    fn test_malformed_json_is_upstream_failure() {
        let err: ApiError = serde_json::from_str::<Value>("{not json")
            .unwrap_err()
            .into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
