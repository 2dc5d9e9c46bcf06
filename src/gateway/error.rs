//! HTTP rendering of [`RpcError`]

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::rpc::{FieldViolation, RpcError};

/// Error body returned by every route
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric status code (gRPC numbering)
    #[schema(example = 3)]
    pub code: i32,
    #[schema(example = "INVALID_ARGUMENT")]
    pub status: String,
    #[schema(example = "invalid parameters")]
    pub msg: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

/// Wrapper so handlers can return `Result<Json<T>, ApiError>`
#[derive(Debug)]
pub struct ApiError(pub RpcError);

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let RpcError {
            code,
            message,
            violations,
        } = self.0;
        let body = ErrorBody {
            code: code.code(),
            status: code.name().to_string(),
            msg: message,
            violations,
        };
        (code.http_status(), Json(body)).into_response()
    }
}
