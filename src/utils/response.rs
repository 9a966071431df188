//! Response helpers. Resource bodies are sent bare; the `success` envelope
//! wraps errors and the health check.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    let body = Envelope {
        success: true,
        data: Some(data),
        message: Some(message.into()),
        error: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub fn error(
    code: &'static str,
    message: String,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body: Envelope<()> = Envelope {
        success: false,
        data: None,
        message: None,
        error: Some(ErrorBody {
            code,
            message,
            details,
        }),
    };
    (status, Json(body)).into_response()
}
