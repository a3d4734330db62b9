//! NF registry (NRF) integration.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     NfConfig + placeholder id
//!     → profile.rs (build_profile, pure)
//!     → client.rs (PUT nf-instances/{id})
//!     → NfInstanceId::publish(assigned id)
//!
//! Shutdown:
//!     NfInstanceId::current()
//!     → client.rs (DELETE nf-instances/{id})
//! ```
//!
//! # Design Decisions
//! - One attempt per call, bounded by `lifecycle.registryTimeoutMs`; no retry
//! - Failures are reported to the caller, which logs and carries on
//! - Rejections and transport failures stay distinguishable

pub mod client;
pub mod profile;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::nrf::NfProfile;
use crate::models::ProblemDetails;

pub use client::NrfClient;
pub use profile::{build_profile, ProfileError};

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry answered with a non-success status.
    #[error("registry rejected the request: {}", .0.title.as_deref().unwrap_or("no reason given"))]
    Rejected(ProblemDetails),
    /// The registry could not be reached or did not answer in time.
    #[error("registry unreachable: {0}")]
    Transport(String),
    #[error("invalid registry URI '{0}'")]
    InvalidUri(String),
}

/// Registration operations against the NF registry.
#[async_trait]
pub trait Registry: Send + Sync + 'static {
    /// Register `profile` under `nf_id`. Returns the id the registry assigned.
    async fn register(&self, nf_id: &str, profile: &NfProfile) -> Result<String, RegistryError>;

    async fn deregister(&self, nf_id: &str) -> Result<(), RegistryError>;
}

/// The NF instance id: a local placeholder until the registry assigns one.
///
/// Written once after registration, read by the shutdown path.
#[derive(Debug)]
pub struct NfInstanceId {
    current: ArcSwap<String>,
}

impl NfInstanceId {
    /// Fresh random placeholder (UUID v4).
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            current: ArcSwap::from_pointee(id.into()),
        }
    }

    pub fn current(&self) -> Arc<String> {
        self.current.load_full()
    }

    /// Replace the placeholder with the registry-assigned id.
    pub fn publish(&self, id: impl Into<String>) {
        self.current.store(Arc::new(id.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_uuid_until_published() {
        let id = NfInstanceId::generate();
        assert!(uuid::Uuid::parse_str(&id.current()).is_ok());

        id.publish("assigned-1");
        assert_eq!(id.current().as_str(), "assigned-1");
    }

    #[test]
    fn rejected_display_uses_title() {
        let err = RegistryError::Rejected(ProblemDetails::with_status(404).with_title("Not Found"));
        assert_eq!(err.to_string(), "registry rejected the request: Not Found");
    }
}
