//! HTTP (SBI) protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, catch-all dispatch)
//!     → routing (method + path → RouteEntry, params)
//!     → request.rs (read body, negotiate content kind, decode payload)
//!         └── multipart.rs (multipart/related split)
//!     → OperationHandler (external business logic)
//!     → response.rs (JSON or multipart/related, problem details)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - One catch-all Axum route; matching is done by the route table so
//!   specificity rules stay in one place
//! - Envelope build failures are answered here and never reach handlers

pub mod multipart;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CompositePayload, ContentKind, DispatchError, Payload, RequestEnvelope, X_REQUEST_ID};
pub use response::{ResponseBody, ResponseEnvelope, SuccessPayload};
pub use server::{build_router, AppState, SbiServer, ServerError, INDEX_GREETING};
