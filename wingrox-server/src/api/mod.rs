//! API Routes
//!
//! Resource handlers shared by every alias, and the error type that renders
//! failures as response envelopes.

pub mod health;
pub mod resources;


use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use wingrox_core::ServiceError;
use wingrox_types::{Envelope, ErrorKind};

/// Handler failure, rendered as `{success: false, error, errorKind}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { status, kind, message: message.into() }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, ErrorKind::ValidationError, message)
            },
            ServiceError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, ErrorKind::NotFound, err.to_string())
            },
            ServiceError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal, "internal store error")
            },
        }
    }
}

/// Well-formed JSON of the wrong shape is a 422; anything unreadable is a 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection {
            JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, ErrorKind::ValidationError, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope: Envelope<()> = Envelope::err(self.kind, self.message);
        (self.status, Json(envelope)).into_response()
    }
}

/// `Json` whose rejections use the envelope format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Fallback for paths no alias covers. Carries no `errorKind`: a missing
/// route must let a client move on to its next alias, a missing record must not.
pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"success": false, "error": "Not found"})))
}
