//! HTTP client for the NRF management API.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Response, StatusCode};
use std::time::Duration;
use url::Url;

use crate::models::nrf::NfProfile;
use crate::models::ProblemDetails;
use crate::observability::metrics;
use crate::registry::{Registry, RegistryError};

const NF_INSTANCES_PATH: &str = "nnrf-nfm/v1/nf-instances";

/// NRF client doing exactly one request per call.
#[derive(Debug, Clone)]
pub struct NrfClient {
    base: Url,
    http: reqwest::Client,
}

impl NrfClient {
    /// Create a client for `nrf_uri`; every call is bounded by `timeout`.
    pub fn new(nrf_uri: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let mut base = Url::parse(nrf_uri).map_err(|_| RegistryError::InvalidUri(nrf_uri.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RegistryError::InvalidUri(nrf_uri.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Ok(Self { base, http })
    }

    /// `{nrfUri}/nnrf-nfm/v1/nf-instances/{nf_id}`
    pub fn instance_url(&self, nf_id: &str) -> Result<Url, RegistryError> {
        let mut url = self
            .base
            .join(NF_INSTANCES_PATH)
            .map_err(|_| RegistryError::InvalidUri(self.base.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RegistryError::InvalidUri(self.base.to_string()))?
            .push(nf_id);
        Ok(url)
    }
}

#[async_trait]
impl Registry for NrfClient {
    async fn register(&self, nf_id: &str, profile: &NfProfile) -> Result<String, RegistryError> {
        let url = self.instance_url(nf_id)?;
        let response = self.http.put(url).json(profile).send().await.map_err(|e| transport("register", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected("register", response).await);
        }
        metrics::record_nrf_call("register", "success");

        let from_location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(id_from_location);
        if let Some(id) = from_location {
            return Ok(id);
        }

        let from_body = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("nfInstanceId").and_then(|v| v.as_str()).map(str::to_string))
            .filter(|id| !id.is_empty());
        Ok(from_body.unwrap_or_else(|| nf_id.to_string()))
    }

    async fn deregister(&self, nf_id: &str) -> Result<(), RegistryError> {
        let url = self.instance_url(nf_id)?;
        let response = self.http.delete(url).send().await.map_err(|e| transport("deregister", e))?;

        if !response.status().is_success() {
            return Err(rejected("deregister", response).await);
        }
        metrics::record_nrf_call("deregister", "success");
        Ok(())
    }
}

fn transport(op: &'static str, error: reqwest::Error) -> RegistryError {
    metrics::record_nrf_call(op, "transport");
    if error.is_timeout() {
        RegistryError::Transport(format!("timed out: {}", error))
    } else {
        RegistryError::Transport(error.to_string())
    }
}

async fn rejected(op: &'static str, response: Response) -> RegistryError {
    metrics::record_nrf_call(op, "rejected");
    let status = response.status();
    let mut problem = response
        .json::<ProblemDetails>()
        .await
        .unwrap_or_else(|_| fallback_problem(status));
    problem.status.get_or_insert(status.as_u16());
    RegistryError::Rejected(problem)
}

fn fallback_problem(status: StatusCode) -> ProblemDetails {
    ProblemDetails::with_status(status.as_u16()).with_title(status.canonical_reason().unwrap_or("Unknown status"))
}

/// Last non-empty path segment of a `Location` value.
fn id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}
