//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup by method)
//!     → matcher.rs (segment-wise pattern match, parameter capture)
//!     → Return: matched RouteEntry + params, or NoMatch (404)
//!
//! Route Compilation (at startup):
//!     enabled service names
//!     → services catalogue (RouteEntry per operation)
//!     → reject duplicate (method, shape) pairs
//!     → sort by specificity (literal segment count)
//!     → freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: most literal segments wins, ties broken by pattern text

pub mod matcher;
pub mod router;

use axum::http::{Method, StatusCode};

use crate::http::request::ContentKind;
use crate::models::communication::PayloadKind;
use crate::services::Operation;

pub use matcher::{PathPattern, PatternError};
pub use router::{RouteError, RouteMatch, RouteTable};

/// What a route expects as request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// No body is read.
    None,
    /// `application/json` only.
    Json(PayloadKind),
    /// `application/json` or `multipart/related`.
    JsonOrMultipart(PayloadKind),
}

impl BodyPolicy {
    pub fn payload_kind(&self) -> Option<PayloadKind> {
        match self {
            BodyPolicy::None => None,
            BodyPolicy::Json(kind) | BodyPolicy::JsonOrMultipart(kind) => Some(*kind),
        }
    }

    pub fn accepts(&self, kind: ContentKind) -> bool {
        match self {
            BodyPolicy::None => false,
            BodyPolicy::Json(_) => kind == ContentKind::SinglePart,
            BodyPolicy::JsonOrMultipart(_) => true,
        }
    }
}

/// Where a matched request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Delegated to the operation handler.
    Operation(Operation),
    /// Not implemented; answered with `200 {}`.
    Stub,
    /// Service index; answered with a plain-text greeting.
    Index,
}

/// One entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Operation name used in logs and metrics.
    pub name: &'static str,
    pub method: Method,
    pub pattern: PathPattern,
    pub body: BodyPolicy,
    /// Success status whose payload is written as `multipart/related`.
    pub multipart_status: Option<StatusCode>,
    pub target: RouteTarget,
}
