//! The seam between the dispatcher and the operation logic.

use axum::http::StatusCode;

use crate::http::request::RequestEnvelope;
use crate::http::response::ResponseEnvelope;
use crate::models::ProblemDetails;
use crate::services::Operation;

/// Business logic for the delegated operations.
///
/// Called synchronously from the dispatch task with a fully decoded
/// envelope; whatever it returns is serialized as-is.
pub trait OperationHandler: Send + Sync + 'static {
    fn handle(&self, operation: Operation, request: RequestEnvelope) -> ResponseEnvelope;
}

impl<F> OperationHandler for F
where
    F: Fn(Operation, RequestEnvelope) -> ResponseEnvelope + Send + Sync + 'static,
{
    fn handle(&self, operation: Operation, request: RequestEnvelope) -> ResponseEnvelope {
        self(operation, request)
    }
}

/// Default handler of the binary: answers every operation with 501.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedHandler;

impl OperationHandler for UnimplementedHandler {
    fn handle(&self, operation: Operation, _request: RequestEnvelope) -> ResponseEnvelope {
        tracing::warn!(operation = operation.name(), "No handler installed");
        ResponseEnvelope::problem(
            ProblemDetails::with_status(StatusCode::NOT_IMPLEMENTED.as_u16())
                .with_title("Not implemented")
                .with_detail(format!("{} has no handler", operation.name()))
                .with_cause("NOT_IMPLEMENTED"),
        )
    }
}
