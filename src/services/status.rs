//! AMF status change notifications to subscribed NFs.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::models::Guami;

/// Status reported in an AMF status change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmfStatus {
    Available,
    Unavailable,
}

impl AmfStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmfStatus::Available => "AVAILABLE",
            AmfStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for AmfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("status notification transport error: {0}")]
    Transport(String),
    #[error("subscriber rejected the status notification: {0}")]
    Rejected(String),
}

/// Sends AMF status changes to the NFs subscribed through
/// `AMFStatusChangeSubscribe`.
#[async_trait]
pub trait StatusChangeNotifier: Send + Sync + 'static {
    async fn notify(&self, status: AmfStatus, guamis: &[Guami]) -> Result<(), NotifyError>;
}

/// Default notifier: no subscription store is wired in, so it only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingStatusNotifier;

#[async_trait]
impl StatusChangeNotifier for LoggingStatusNotifier {
    async fn notify(&self, status: AmfStatus, guamis: &[Guami]) -> Result<(), NotifyError> {
        tracing::info!(status = %status, guamis = guamis.len(), "AMF status change");
        Ok(())
    }
}
