//! AMF service shell: SBI dispatch, NRF registration, signaling listener
//! and ordered shutdown.

// Core subsystems
pub mod config;
pub mod http;
pub mod models;
pub mod net;
pub mod routing;
pub mod services;

// External peers
pub mod registry;
pub mod signaling;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::NfConfig;
pub use lifecycle::{Nf, RunningNf, Shutdown};
