//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Signaling peer connects
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (id, active count for drain)
//!     → Hand off to the signaling handler
//!
//! SBI over https
//!     → tls.rs (PEM certificate and key → rustls config)
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - Each connection tracked for graceful shutdown

pub mod connection;
pub mod listener;
pub mod tls;
