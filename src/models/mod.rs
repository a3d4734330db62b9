//! Wire models shared across subsystems.
//!
//! # Layout
//! ```text
//! common.rs        → PLMN / GUAMI / TAI / S-NSSAI identity types
//! problem.rs       → ProblemDetails (every failure body)
//! communication.rs → Namf_Communication request payloads
//! nrf.rs           → NfProfile sent to the registry
//! ```
//!
//! # Design Decisions
//! - Field names follow the camelCase JSON of the service-based interface
//! - Payload structs keep only the members this shell relies on; everything
//!   else is preserved in a flattened `extra` map for the external handlers

pub mod common;
pub mod communication;
pub mod nrf;
pub mod problem;

pub use common::{AmfId, Guami, NetworkName, PlmnId, PlmnSupportItem, Snssai, Tai};
pub use problem::ProblemDetails;
