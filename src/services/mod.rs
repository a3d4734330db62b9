//! Service catalogue.
//!
//! # Data Flow
//! ```text
//! configuration.serviceNameList
//!     → ServiceName::from_name (unknown names dropped)
//!     → service_routes (route entries under each service root)
//!     → RouteTable::new
//! ```
//!
//! # Design Decisions
//! - The set of service names is closed; only `namf-comm` carries routes here
//! - Operation semantics live behind [`OperationHandler`]
//! - Outgoing status change notifications go through [`StatusChangeNotifier`]

pub mod communication;
pub mod handler;
pub mod status;

use std::fmt;

use crate::routing::{RouteEntry, RouteError, RouteTable};

pub use communication::Operation;
pub use handler::{OperationHandler, UnimplementedHandler};
pub use status::{AmfStatus, LoggingStatusNotifier, NotifyError, StatusChangeNotifier};

/// Services this NF can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    NamfComm,
    NamfEvts,
    NamfMt,
    NamfLoc,
}

impl ServiceName {
    pub const ALL: [ServiceName; 4] = [
        ServiceName::NamfComm,
        ServiceName::NamfEvts,
        ServiceName::NamfMt,
        ServiceName::NamfLoc,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::NamfComm => "namf-comm",
            ServiceName::NamfEvts => "namf-evts",
            ServiceName::NamfMt => "namf-mt",
            ServiceName::NamfLoc => "namf-loc",
        }
    }

    /// API root, e.g. `/namf-comm/v1`.
    pub fn api_root(&self) -> String {
        format!("/{}/v1", self.as_str())
    }

    /// Route entries served for this service.
    pub fn routes(&self) -> Vec<RouteEntry> {
        match self {
            ServiceName::NamfComm => communication::routes(&self.api_root()),
            ServiceName::NamfEvts | ServiceName::NamfMt | ServiceName::NamfLoc => Vec::new(),
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve configured names, keeping order and dropping unknown or repeated ones.
pub fn enabled_services(names: &[String]) -> Vec<ServiceName> {
    let mut services = Vec::new();
    for name in names {
        match ServiceName::from_name(name) {
            Some(service) if !services.contains(&service) => services.push(service),
            Some(_) => {}
            None => tracing::debug!(service = %name, "Skipping unknown service name"),
        }
    }
    services
}

/// Build the route table for the enabled services.
pub fn build_route_table(services: &[ServiceName]) -> Result<RouteTable, RouteError> {
    RouteTable::new(services.iter().flat_map(ServiceName::routes).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_repeated_names_are_dropped() {
        let names = vec!["namf-comm".to_string(), "nudm-sdm".to_string(), "namf-comm".to_string(), "namf-loc".to_string()];
        assert_eq!(enabled_services(&names), vec![ServiceName::NamfComm, ServiceName::NamfLoc]);
    }

    #[test]
    fn only_comm_has_routes() {
        let table = build_route_table(&ServiceName::ALL).unwrap();
        assert_eq!(table.len(), 16);
        assert!(table.iter().all(|r| r.pattern.as_str().starts_with("/namf-comm/v1/")));
    }

    #[test]
    fn building_twice_is_identical() {
        let a = build_route_table(&[ServiceName::NamfComm]).unwrap();
        let b = build_route_table(&[ServiceName::NamfComm]).unwrap();
        let keys = |t: &RouteTable| t.iter().map(|r| (r.method.clone(), r.pattern.to_string())).collect::<Vec<_>>();
        assert_eq!(keys(&a), keys(&b));
    }
}
