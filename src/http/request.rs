//! Request envelope construction.
//!
//! # Responsibilities
//! - Read the raw body (bounded by `sbi.maxBodySize`)
//! - Negotiate the content kind against what the route accepts
//! - Decode the body into the route's payload type
//! - Carry path parameters verbatim
//!
//! # Design Decisions
//! - Body read failures are reported before any content-type check
//! - A missing `Content-Type` on a body route is read as JSON
//! - Decode errors never reach the operation handler

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderMap, Request};
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

use crate::http::multipart::{self, BinaryPart, MULTIPART_RELATED};
use crate::models::communication::{JsonPayload, PayloadKind};
use crate::models::ProblemDetails;
use crate::routing::BodyPolicy;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Wire encodings a route may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/json`
    SinglePart,
    /// `multipart/related`
    MultiPart,
}

impl ContentKind {
    /// Classify a content type header. `None` means the media type is not supported.
    pub fn from_headers(headers: &HeaderMap) -> Option<Result<Self, String>> {
        let value = headers.get(header::CONTENT_TYPE)?;
        let Ok(value) = value.to_str() else {
            return Some(Err("<non-ascii>".to_string()));
        };
        let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        Some(if multipart::is_json_media_type(&essence) {
            Ok(ContentKind::SinglePart)
        } else if essence == MULTIPART_RELATED {
            Ok(ContentKind::MultiPart)
        } else {
            Err(value.to_string())
        })
    }
}

/// JSON root plus binary parts of a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositePayload {
    pub json: JsonPayload,
    pub binaries: Vec<BinaryPart>,
}

/// Decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(JsonPayload),
    Multipart(CompositePayload),
}

impl Payload {
    /// The JSON document regardless of the wire encoding.
    pub fn json(&self) -> &JsonPayload {
        match self {
            Payload::Json(json) => json,
            Payload::Multipart(composite) => &composite.json,
        }
    }

    /// Binary parts; empty for single-part requests.
    pub fn binaries(&self) -> &[BinaryPart] {
        match self {
            Payload::Json(_) => &[],
            Payload::Multipart(composite) => &composite.binaries,
        }
    }
}

/// Everything an operation handler gets to see of a request.
#[derive(Debug)]
pub struct RequestEnvelope {
    pub head: Parts,
    pub payload: Option<Payload>,
    pub params: HashMap<String, String>,
}

impl RequestEnvelope {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Request id assigned by the request-id layer, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.head.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }
}

/// Why an envelope could not be built.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The body could not be decoded as the operation's payload.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// The body could not be read, or a response could not be written.
    #[error("system failure: {0}")]
    SystemFailure(String),
}

impl DispatchError {
    pub fn into_problem(self) -> ProblemDetails {
        match self {
            DispatchError::MalformedRequest(detail) => {
                ProblemDetails::malformed_request(format!("[Request Body] {}", detail))
            }
            DispatchError::SystemFailure(detail) => ProblemDetails::system_failure(detail),
        }
    }
}

/// Build the envelope for a matched route.
pub async fn build_envelope(
    request: Request<Body>,
    body_policy: BodyPolicy,
    params: HashMap<String, String>,
    max_body_size: usize,
) -> Result<RequestEnvelope, DispatchError> {
    let (head, body) = request.into_parts();

    let Some(kind) = body_policy.payload_kind() else {
        return Ok(RequestEnvelope {
            head,
            payload: None,
            params,
        });
    };

    let bytes = axum::body::to_bytes(body, max_body_size)
        .await
        .map_err(|e| DispatchError::SystemFailure(format!("failed to read request body: {}", e)))?;

    let content_kind = match ContentKind::from_headers(&head.headers) {
        None => ContentKind::SinglePart,
        Some(Ok(content_kind)) if body_policy.accepts(content_kind) => content_kind,
        Some(Ok(_)) | Some(Err(_)) => {
            let value = head
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<non-ascii>");
            return Err(DispatchError::MalformedRequest(format!("unsupported content type '{}'", value)));
        }
    };

    let payload = decode_payload(kind, content_kind, &head.headers, bytes).await?;
    Ok(RequestEnvelope {
        head,
        payload: Some(payload),
        params,
    })
}

async fn decode_payload(
    kind: PayloadKind,
    content_kind: ContentKind,
    headers: &HeaderMap,
    bytes: Bytes,
) -> Result<Payload, DispatchError> {
    match content_kind {
        ContentKind::SinglePart => kind
            .decode(&bytes)
            .map(Payload::Json)
            .map_err(|e| DispatchError::MalformedRequest(e.to_string())),
        ContentKind::MultiPart => {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(MULTIPART_RELATED);
            let related = multipart::parse_related(content_type, bytes)
                .await
                .map_err(|e| DispatchError::MalformedRequest(e.to_string()))?;
            let json = kind
                .decode(&related.root)
                .map_err(|e| DispatchError::MalformedRequest(e.to_string()))?;
            Ok(Payload::Multipart(CompositePayload {
                json,
                binaries: related.binaries,
            }))
        }
    }
}
