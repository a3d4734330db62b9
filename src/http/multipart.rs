//! `multipart/related` codec.
//!
//! # Responsibilities
//! - Split a `multipart/related` body into its parts
//! - Pick the JSON root part; everything else is carried as binary
//! - Encode a JSON root plus binary parts into a fresh body
//!
//! # Design Decisions
//! - Decoding goes through `multer` on the fully buffered body (the body
//!   limit already bounds it)
//! - Our own `boundary()` is used since `multer::parse_boundary` only
//!   accepts `multipart/form-data`
//! - Encoding is hand-written; boundaries are random UUIDs

use axum::http::header::CONTENT_TYPE;
use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use thiserror::Error;

pub const MULTIPART_RELATED: &str = "multipart/related";
pub const APPLICATION_JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Errors produced while decoding or encoding multipart bodies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("multipart content type has no boundary parameter")]
    MissingBoundary,
    #[error("malformed multipart body: {0}")]
    Malformed(String),
    #[error("multipart body contains no parts")]
    NoParts,
    #[error("multipart body has no application/json root part")]
    MissingJsonRoot,
    #[error("header value {0:?} cannot be written into a part")]
    InvalidHeaderValue(String),
}

/// A non-JSON part of a multipart message (e.g. an NGAP or NAS PDU).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPart {
    pub content_id: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl BinaryPart {
    pub fn new(content_id: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_id: Some(content_id.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }
}

/// A decoded multipart body: the JSON root and the remaining parts in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedBody {
    pub root: Bytes,
    pub binaries: Vec<BinaryPart>,
}

/// Extract the `boundary` parameter from a content type header value.
pub fn boundary(content_type: &str) -> Result<&str, MultipartError> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Decode a `multipart/related` body.
///
/// The root is the first part whose content type is JSON (or that has no
/// content type at all); every other part is returned as binary.
pub async fn parse_related(content_type: &str, body: Bytes) -> Result<RelatedBody, MultipartError> {
    let boundary = boundary(content_type)?.to_string();
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let headers = field.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        };
        let content_type = header(CONTENT_TYPE.as_str());
        let content_id = header("content-id");
        let data = field.bytes().await.map_err(malformed)?;
        parts.push(BinaryPart {
            content_id,
            content_type,
            data,
        });
    }

    if parts.is_empty() {
        return Err(MultipartError::NoParts);
    }

    let root_index = parts
        .iter()
        .position(|part| part.content_type.as_deref().map_or(true, is_json_media_type))
        .ok_or(MultipartError::MissingJsonRoot)?;
    let root = parts.remove(root_index).data;

    Ok(RelatedBody { root, binaries: parts })
}

fn malformed(e: multer::Error) -> MultipartError {
    MultipartError::Malformed(e.to_string())
}

/// Encode a JSON root and binary parts. Returns the body and its content type.
pub fn encode_related(root: &[u8], binaries: &[BinaryPart]) -> Result<(Bytes, String), MultipartError> {
    let boundary = uuid::Uuid::new_v4().simple().to_string();
    let mut out = BytesMut::with_capacity(root.len() + binaries.iter().map(|b| b.data.len() + 128).sum::<usize>() + 128);

    write_part_head(&mut out, &boundary, None, APPLICATION_JSON)?;
    out.put_slice(root);
    out.put_slice(b"\r\n");

    for part in binaries {
        let content_type = part.content_type.as_deref().unwrap_or(OCTET_STREAM);
        write_part_head(&mut out, &boundary, part.content_id.as_deref(), content_type)?;
        out.put_slice(&part.data);
        out.put_slice(b"\r\n");
    }
    out.put_slice(format!("--{}--\r\n", boundary).as_bytes());

    let content_type = format!("{}; boundary={}", MULTIPART_RELATED, boundary);
    Ok((out.freeze(), content_type))
}

/// JSON media types: `application/json` and any `+json` suffix.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == APPLICATION_JSON || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn write_part_head(
    out: &mut BytesMut,
    boundary: &str,
    content_id: Option<&str>,
    content_type: &str,
) -> Result<(), MultipartError> {
    out.put_slice(format!("--{}\r\n", boundary).as_bytes());
    if let Some(id) = content_id {
        out.put_slice(format!("Content-Id: {}\r\n", header_safe(id)?).as_bytes());
    }
    out.put_slice(format!("Content-Type: {}\r\n\r\n", header_safe(content_type)?).as_bytes());
    Ok(())
}

fn header_safe(value: &str) -> Result<&str, MultipartError> {
    if value.contains(['\r', '\n']) {
        Err(MultipartError::InvalidHeaderValue(value.to_string()))
    } else {
        Ok(value)
    }
}
