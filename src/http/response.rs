//! Response envelopes and their wire serialization.
//!
//! # Responsibilities
//! - Carry the handler's status and tagged body
//! - Pick single-part JSON or `multipart/related` per route
//! - Turn serialization failures into a 500 problem
//!
//! # Design Decisions
//! - The body is a tagged enum; a response never carries both payload and problem
//! - Multipart is used only when a success payload meets the route's trigger status
//! - Problems are always single-part JSON with `status` mirroring the HTTP status

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::http::multipart::{self, BinaryPart, APPLICATION_JSON};
use crate::models::ProblemDetails;

/// Success payload: a JSON document plus optional binary parts.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessPayload {
    pub json: Value,
    pub binaries: Vec<BinaryPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Success(SuccessPayload),
    Problem(ProblemDetails),
}

/// What an operation handler returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    /// Status with no body (e.g. 204).
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: ResponseBody::Empty,
        }
    }

    /// Success with a JSON document. A value that cannot be represented as
    /// JSON becomes a 500 problem.
    pub fn success<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        Self::with_parts(status, payload, Vec::new())
    }

    /// Success with a JSON document and binary parts.
    pub fn with_parts<T: Serialize>(status: StatusCode, payload: &T, binaries: Vec<BinaryPart>) -> Self {
        match serde_json::to_value(payload) {
            Ok(json) => Self {
                status,
                body: ResponseBody::Success(SuccessPayload { json, binaries }),
            },
            Err(e) => Self::problem(ProblemDetails::system_failure(format!("failed to encode response: {}", e))),
        }
    }

    /// Failure response; the HTTP status follows `problem.status` (500 when absent).
    pub fn problem(problem: ProblemDetails) -> Self {
        let status = problem
            .status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: ResponseBody::Problem(problem),
        }
    }

    /// Reply for operations that are not implemented yet: 200 with `{}`.
    pub fn stub() -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Success(SuccessPayload {
                json: Value::Object(Default::default()),
                binaries: Vec::new(),
            }),
        }
    }

    /// Serialize onto the wire. `multipart_status` is the route's trigger status.
    pub fn into_response(self, multipart_status: Option<StatusCode>) -> Response {
        let status = self.status;
        let encoded = match self.body {
            ResponseBody::Empty => return plain(status, None, Bytes::new()),
            ResponseBody::Success(payload) => encode_success(status, payload, multipart_status),
            ResponseBody::Problem(mut problem) => {
                problem.status.get_or_insert(status.as_u16());
                encode_json(&problem).map(|body| (APPLICATION_JSON.to_string(), body))
            }
        };

        match encoded {
            Ok((content_type, body)) => plain(status, Some(&content_type), body),
            Err(detail) => {
                tracing::error!(status = %status, error = %detail, "Response serialization failed");
                system_failure_response(detail)
            }
        }
    }
}

fn encode_success(
    status: StatusCode,
    payload: SuccessPayload,
    multipart_status: Option<StatusCode>,
) -> Result<(String, Bytes), String> {
    let json = encode_json(&payload.json)?;
    if multipart_status == Some(status) {
        let (body, content_type) =
            multipart::encode_related(&json, &payload.binaries).map_err(|e| e.to_string())?;
        Ok((content_type, body))
    } else {
        Ok((APPLICATION_JSON.to_string(), json))
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<Bytes, String> {
    serde_json::to_vec(value).map(Bytes::from).map_err(|e| e.to_string())
}

fn system_failure_response(detail: String) -> Response {
    let problem = ProblemDetails::system_failure(detail);
    let body = serde_json::to_vec(&problem).unwrap_or_else(|_| b"{}".to_vec());
    plain(StatusCode::INTERNAL_SERVER_ERROR, Some(APPLICATION_JSON), Bytes::from(body))
}

fn plain(status: StatusCode, content_type: Option<&str>, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(value) = content_type.and_then(|ct| HeaderValue::from_str(ct).ok()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_of(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response.headers()[header::CONTENT_TYPE].to_str().unwrap()
    }

    #[tokio::test]
    async fn trigger_status_selects_multipart() {
        let envelope = ResponseEnvelope::with_parts(
            StatusCode::CREATED,
            &json!({"ueContext": {}}),
            vec![BinaryPart::new("ngap-sm", "application/vnd.3gpp.ngap", vec![9u8])],
        );
        let response = envelope.into_response(Some(StatusCode::CREATED));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(content_type(&response).starts_with("multipart/related; boundary="));
    }

    #[tokio::test]
    async fn other_status_stays_json() {
        let envelope = ResponseEnvelope::success(StatusCode::OK, &json!({"a": 1}));
        let response = envelope.into_response(Some(StatusCode::CREATED));
        assert_eq!(content_type(&response), "application/json");
        assert_eq!(&body_of(response).await[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn problem_is_json_with_mirrored_status() {
        let problem = ProblemDetails::default().with_title("Context not found").with_cause("CONTEXT_NOT_FOUND");
        let mut envelope = ResponseEnvelope::problem(problem);
        envelope.status = StatusCode::NOT_FOUND;
        let response = envelope.into_response(Some(StatusCode::NOT_FOUND));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(content_type(&response), "application/json");
        let body: Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body["status"], 404);
        assert_eq!(body["cause"], "CONTEXT_NOT_FOUND");
    }

    #[tokio::test]
    async fn multipart_encode_failure_overrides_status() {
        let envelope = ResponseEnvelope::with_parts(
            StatusCode::CREATED,
            &json!({}),
            vec![BinaryPart::new("bad\nid", "application/octet-stream", Vec::new())],
        );
        let response = envelope.into_response(Some(StatusCode::CREATED));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body["cause"], "SYSTEM_FAILURE");
    }

    #[tokio::test]
    async fn unserializable_payload_is_system_failure() {
        let mut map = std::collections::HashMap::new();
        map.insert((1u8, 2u8), "tuple keys are not JSON");
        let envelope = ResponseEnvelope::success(StatusCode::OK, &map);
        assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(envelope.body, ResponseBody::Problem(ref p) if p.cause.as_deref() == Some("SYSTEM_FAILURE")));
    }

    #[tokio::test]
    async fn empty_body_has_no_content_type() {
        let response = ResponseEnvelope::empty(StatusCode::NO_CONTENT).into_response(None);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn stub_is_empty_object() {
        let response = ResponseEnvelope::stub().into_response(None);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&body_of(response).await[..], b"{}");
    }
}
