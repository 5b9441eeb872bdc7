use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// Uniform JSON response: status, optional payload, JSON content type and
/// permissive cross-origin headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Response with a JSON payload
    pub fn json(status_code: StatusCode, body: Value) -> Self {
        Self {
            status_code,
            body: Some(body),
        }
    }

    /// Response with an empty body
    pub fn empty(status_code: StatusCode) -> Self {
        Self {
            status_code,
            body: None,
        }
    }

    /// 200 OK with the serialized payload. `None` yields an empty body.
    pub fn success<T: Serialize>(data: Option<T>) -> Self {
        match data.map(|d| serde_json::to_value(&d)) {
            Some(Ok(value)) => Self::json(StatusCode::OK, value),
            Some(Err(e)) => {
                tracing::error!("Failed to serialize response data: {}", e);
                Self::json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "message": "Failed to serialize response data" }),
                )
            }
            None => Self::empty(StatusCode::OK),
        }
    }

    /// 201 Created with no body
    pub fn created() -> Self {
        Self::empty(StatusCode::CREATED)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status_code;

        let headers = response.headers_mut();
        let any = HeaderValue::from_static("*");
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, any);

        response
    }
}

// Convenience type aliases
pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
