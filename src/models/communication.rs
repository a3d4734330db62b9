//! Namf_Communication request payloads.
//!
//! Each operation that carries a body names a [`PayloadKind`]; the kind is
//! fixed per route when the route table is built and decodes raw JSON into
//! the matching [`JsonPayload`] variant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{Guami, PlmnId};

/// Members not interpreted by this shell, kept for the handlers.
pub type Extra = Map<String, Value>;

/// AMF status change subscription (create and modify).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    pub amf_status_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guami_list: Option<Vec<Guami>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// JSON part of a CreateUEContext request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UeContextCreateData {
    pub ue_context: Value,
    pub target_id: Value,
    pub source_to_target_data: Value,
    pub pdu_session_list: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n2_notify_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// EPS bearer ID assignment request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignEbiData {
    pub pdu_session_id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arp_list: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_ebi_list: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_guami: Option<Guami>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Registration status update after a UE context transfer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UeRegStatusUpdateReqData {
    pub transfer_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_release_session_list: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcf_reselected_ind: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// UE context release request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UeContextRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unauthenticated_supi: Option<bool>,
    pub ngap_cause: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// JSON part of a UEContextTransfer request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UeContextTransferReqData {
    pub reason: String,
    pub access_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plmn_id: Option<PlmnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_request: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// JSON part of an N1N2MessageTransfer request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct N1N2MessageTransferReqData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n1_message_container: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n2_info_container: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_ind: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdu_session_id: Option<u8>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// UE-specific N1/N2 information subscription.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UeN1N2InfoSubscriptionCreateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n2_information_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n2_notify_callback_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n1_message_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n1_notify_callback_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The JSON payload type an operation expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    SubscriptionData,
    UeContextCreateData,
    AssignEbiData,
    UeRegStatusUpdateReqData,
    UeContextRelease,
    UeContextTransferReqData,
    N1N2MessageTransferReqData,
    UeN1N2InfoSubscriptionCreateData,
}

impl PayloadKind {
    /// Decode a JSON document into this kind's payload.
    pub fn decode(self, bytes: &[u8]) -> serde_json::Result<JsonPayload> {
        Ok(match self {
            PayloadKind::SubscriptionData => JsonPayload::SubscriptionData(serde_json::from_slice(bytes)?),
            PayloadKind::UeContextCreateData => JsonPayload::UeContextCreateData(serde_json::from_slice(bytes)?),
            PayloadKind::AssignEbiData => JsonPayload::AssignEbiData(serde_json::from_slice(bytes)?),
            PayloadKind::UeRegStatusUpdateReqData => {
                JsonPayload::UeRegStatusUpdateReqData(serde_json::from_slice(bytes)?)
            }
            PayloadKind::UeContextRelease => JsonPayload::UeContextRelease(serde_json::from_slice(bytes)?),
            PayloadKind::UeContextTransferReqData => {
                JsonPayload::UeContextTransferReqData(serde_json::from_slice(bytes)?)
            }
            PayloadKind::N1N2MessageTransferReqData => {
                JsonPayload::N1N2MessageTransferReqData(serde_json::from_slice(bytes)?)
            }
            PayloadKind::UeN1N2InfoSubscriptionCreateData => {
                JsonPayload::UeN1N2InfoSubscriptionCreateData(serde_json::from_slice(bytes)?)
            }
        })
    }
}

/// A decoded JSON request body.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPayload {
    SubscriptionData(SubscriptionData),
    UeContextCreateData(UeContextCreateData),
    AssignEbiData(AssignEbiData),
    UeRegStatusUpdateReqData(UeRegStatusUpdateReqData),
    UeContextRelease(UeContextRelease),
    UeContextTransferReqData(UeContextTransferReqData),
    N1N2MessageTransferReqData(N1N2MessageTransferReqData),
    UeN1N2InfoSubscriptionCreateData(UeN1N2InfoSubscriptionCreateData),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_unknown_members() {
        let raw = br#"{"amfStatusUri":"http://nf/cb","vendorHint":7}"#;
        match PayloadKind::SubscriptionData.decode(raw).unwrap() {
            JsonPayload::SubscriptionData(data) => {
                assert_eq!(data.amf_status_uri, "http://nf/cb");
                assert_eq!(data.extra["vendorHint"], 7);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_missing_required_member() {
        let err = PayloadKind::UeContextRelease.decode(br#"{"supi":"imsi-1"}"#).unwrap_err();
        assert!(err.to_string().contains("ngapCause"));
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        assert!(PayloadKind::AssignEbiData.decode(br#"{"pduSessionId":"five"}"#).is_err());
        assert!(PayloadKind::SubscriptionData.decode(b"[]").is_err());
        assert!(PayloadKind::N1N2MessageTransferReqData.decode(b"").is_err());
    }

    #[test]
    fn optional_only_payload_accepts_empty_object() {
        assert!(PayloadKind::N1N2MessageTransferReqData.decode(b"{}").is_ok());
    }
}
