//! Namf_Communication operations and their routes.

use axum::http::{Method, StatusCode};

use crate::models::communication::PayloadKind;
use crate::routing::{BodyPolicy, PathPattern, RouteEntry, RouteTarget};

/// Operations delegated to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AmfStatusChangeSubscribeModify,
    AmfStatusChangeUnSubscribe,
    AmfStatusChangeSubscribe,
    CreateUeContext,
    EbiAssignment,
    RegistrationStatusUpdate,
    ReleaseUeContext,
    UeContextTransfer,
    N1N2MessageTransfer,
    N1N2MessageTransferStatus,
    N1N2MessageSubscribe,
    N1N2MessageUnSubscribe,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AmfStatusChangeSubscribeModify => "AMFStatusChangeSubscribeModify",
            Operation::AmfStatusChangeUnSubscribe => "AMFStatusChangeUnSubscribe",
            Operation::AmfStatusChangeSubscribe => "AMFStatusChangeSubscribe",
            Operation::CreateUeContext => "CreateUEContext",
            Operation::EbiAssignment => "EBIAssignment",
            Operation::RegistrationStatusUpdate => "RegistrationStatusUpdate",
            Operation::ReleaseUeContext => "ReleaseUEContext",
            Operation::UeContextTransfer => "UEContextTransfer",
            Operation::N1N2MessageTransfer => "N1N2MessageTransfer",
            Operation::N1N2MessageTransferStatus => "N1N2MessageTransferStatus",
            Operation::N1N2MessageSubscribe => "N1N2MessageSubscribe",
            Operation::N1N2MessageUnSubscribe => "N1N2MessageUnSubscribe",
        }
    }
}

struct Def {
    name: &'static str,
    method: Method,
    path: &'static str,
    body: BodyPolicy,
    multipart_status: Option<StatusCode>,
    target: RouteTarget,
}

fn op(operation: Operation, method: Method, path: &'static str, body: BodyPolicy) -> Def {
    Def {
        name: operation.name(),
        method,
        path,
        body,
        multipart_status: None,
        target: RouteTarget::Operation(operation),
    }
}

fn stub(name: &'static str, method: Method, path: &'static str) -> Def {
    Def {
        name,
        method,
        path,
        body: BodyPolicy::None,
        multipart_status: None,
        target: RouteTarget::Stub,
    }
}

fn definitions() -> Vec<Def> {
    use BodyPolicy::{Json, JsonOrMultipart};
    use Operation::*;

    vec![
        Def {
            target: RouteTarget::Index,
            ..stub("Index", Method::GET, "/")
        },
        op(AmfStatusChangeSubscribeModify, Method::PUT, "/subscriptions/:subscriptionId", Json(PayloadKind::SubscriptionData)),
        op(AmfStatusChangeUnSubscribe, Method::DELETE, "/subscriptions/:subscriptionId", BodyPolicy::None),
        op(AmfStatusChangeSubscribe, Method::POST, "/subscriptions", Json(PayloadKind::SubscriptionData)),
        Def {
            multipart_status: Some(StatusCode::CREATED),
            ..op(CreateUeContext, Method::PUT, "/ue-contexts/:ueContextId", JsonOrMultipart(PayloadKind::UeContextCreateData))
        },
        op(EbiAssignment, Method::POST, "/ue-contexts/:ueContextId/assign-ebi", Json(PayloadKind::AssignEbiData)),
        op(
            RegistrationStatusUpdate,
            Method::POST,
            "/ue-contexts/:ueContextId/transfer-update",
            Json(PayloadKind::UeRegStatusUpdateReqData),
        ),
        op(ReleaseUeContext, Method::POST, "/ue-contexts/:ueContextId/release", Json(PayloadKind::UeContextRelease)),
        Def {
            multipart_status: Some(StatusCode::OK),
            ..op(
                UeContextTransfer,
                Method::POST,
                "/ue-contexts/:ueContextId/transfer",
                JsonOrMultipart(PayloadKind::UeContextTransferReqData),
            )
        },
        op(
            N1N2MessageTransfer,
            Method::POST,
            "/ue-contexts/:ueContextId/n1-n2-messages",
            JsonOrMultipart(PayloadKind::N1N2MessageTransferReqData),
        ),
        op(
            N1N2MessageTransferStatus,
            Method::GET,
            "/ue-contexts/:ueContextId/n1-n2-messages/:n1N2MessageId",
            BodyPolicy::None,
        ),
        op(
            N1N2MessageSubscribe,
            Method::POST,
            "/ue-contexts/:ueContextId/n1-n2-messages/subscriptions",
            Json(PayloadKind::UeN1N2InfoSubscriptionCreateData),
        ),
        op(
            N1N2MessageUnSubscribe,
            Method::DELETE,
            "/ue-contexts/:ueContextId/n1-n2-messages/subscriptions/:subscriptionId",
            BodyPolicy::None,
        ),
        stub("NonUeN2MessageTransfer", Method::POST, "/non-ue-n2-messages/transfer"),
        stub("NonUeN2InfoSubscribe", Method::POST, "/non-ue-n2-messages/subscriptions"),
        stub(
            "NonUeN2InfoUnSubscribe",
            Method::DELETE,
            "/non-ue-n2-messages/subscriptions/:n2NotifySubscriptionId",
        ),
    ]
}

/// Route entries rooted at `api_root`.
pub fn routes(api_root: &str) -> Vec<RouteEntry> {
    definitions()
        .into_iter()
        .filter_map(|def| {
            let full = format!("{}{}", api_root, def.path);
            match PathPattern::parse(&full) {
                Ok(pattern) => Some(RouteEntry {
                    name: def.name,
                    method: def.method,
                    pattern,
                    body: def.body,
                    multipart_status: def.multipart_status,
                    target: def.target,
                }),
                Err(e) => {
                    tracing::error!(error = %e, "Skipping route");
                    None
                }
            }
        })
        .collect()
}
