//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     NfConfig → route table ∥ signaling listener → bind SBI → register → Serving
//!
//! Termination (shutdown.rs):
//!     SIGINT/SIGTERM or RunningNf::terminate
//!     → notify peers → stop signaling → deregister → status UNAVAILABLE
//!     → release SBI → Stopped
//!
//! State (state.rs):
//!     Unstarted → Starting → Serving → Terminating → Stopped
//! ```
//!
//! # Design Decisions
//! - Termination is one-shot; a second trigger is a no-op
//! - Every termination step is bounded by a configured timeout
//! - Only SBI listener setup failure is fatal

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{Shutdown, ShutdownSequence};
pub use startup::{Nf, NfBuilder, RunningNf, StartupError};
pub use state::{LifecycleState, StateCell, StateError};
