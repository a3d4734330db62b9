//! Problem details carried by every failure response.

use serde::{Deserialize, Serialize};

/// Cause code for failures that are not the caller's fault.
pub const CAUSE_SYSTEM_FAILURE: &str = "SYSTEM_FAILURE";

/// Structured problem description (RFC 7807 shape with a 3GPP `cause`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI reference identifying the problem type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Mirrors the HTTP status of the response carrying it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Machine-readable application cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<InvalidParam>>,
}

impl ProblemDetails {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// 400 for a body that could not be read as the operation's payload.
    pub fn malformed_request(detail: impl Into<String>) -> Self {
        Self::with_status(400)
            .with_title("Malformed request syntax")
            .with_detail(detail)
    }

    /// 500 with the `SYSTEM_FAILURE` cause.
    pub fn system_failure(detail: impl Into<String>) -> Self {
        Self::with_status(500)
            .with_title("System failure")
            .with_detail(detail)
            .with_cause(CAUSE_SYSTEM_FAILURE)
    }
}

/// Invalid parameter reference inside a problem description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct InvalidParam {
    pub param: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_request_has_no_cause() {
        let problem = ProblemDetails::malformed_request("[Request Body] bad");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["title"], "Malformed request syntax");
        assert!(json.get("cause").is_none());
    }

    #[test]
    fn system_failure_sets_cause() {
        let json = serde_json::to_value(ProblemDetails::system_failure("io")).unwrap();
        assert_eq!(json["status"], 500);
        assert_eq!(json["cause"], "SYSTEM_FAILURE");
    }

    #[test]
    fn decodes_registry_problem_with_type() {
        let raw = r#"{"type":"about:blank","title":"Not Found","status":404,"invalidParams":[{"param":"nfInstanceId"}]}"#;
        let problem: ProblemDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(problem.problem_type.as_deref(), Some("about:blank"));
        assert_eq!(problem.status, Some(404));
        assert_eq!(problem.invalid_params.unwrap()[0].param, "nfInstanceId");
    }
}
