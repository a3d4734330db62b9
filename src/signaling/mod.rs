//! Signaling listener subsystem.
//!
//! # Data Flow
//! ```text
//! ngapIpList × ngapPort
//!     → server.rs (one accept loop per bound address)
//!     → peer.rs (PeerNode leased into the PeerRegistry)
//!     → handler.rs (SignalingHandler::serve per connection)
//!
//! Termination:
//!     PeerRegistry::snapshot → notify_unavailable (per-peer timeout)
//!     → stop accept loops → drain workers (bounded) → abort stragglers
//! ```
//!
//! # Design Decisions
//! - Framing and message encoding belong to the plugged-in handler
//! - A bind failure only loses that address; the SBI side keeps running
//! - Peer iteration always works on a snapshot, never on the live map

pub mod handler;
pub mod peer;
pub mod server;

pub use handler::{LoggingSignalingHandler, SignalingError, SignalingHandler};
pub use peer::{PeerLease, PeerNode, PeerRegistry};
pub use server::{NotifySummary, SignalingConfig, SignalingServer};
