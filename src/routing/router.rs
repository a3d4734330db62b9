//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the matching route for (method, path)
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over the few routes of one method
//! - Explicit NoMatch rather than silent default

use axum::http::Method;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::routing::RouteEntry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Two entries would answer the same requests.
    #[error("duplicate route {method} {pattern} ({first} and {second})")]
    Duplicate {
        method: Method,
        pattern: String,
        first: &'static str,
        second: &'static str,
    },
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: HashMap<String, String>,
}

/// Immutable route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compile a route table. Building twice from the same entries yields the
    /// same table.
    pub fn new(mut routes: Vec<RouteEntry>) -> Result<Self, RouteError> {
        let mut seen: HashMap<(Method, String), &'static str> = HashMap::new();
        for route in &routes {
            let key = (route.method.clone(), route.pattern.shape());
            if let Some(first) = seen.insert(key, route.name) {
                return Err(RouteError::Duplicate {
                    method: route.method.clone(),
                    pattern: route.pattern.to_string(),
                    first,
                    second: route.name,
                });
            }
        }

        routes.sort_by(|a, b| {
            b.pattern
                .literal_count()
                .cmp(&a.pattern.literal_count())
                .then_with(|| a.pattern.as_str().cmp(b.pattern.as_str()))
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });

        for route in &routes {
            tracing::debug!(
                name = route.name,
                method = %route.method,
                pattern = %route.pattern,
                "Route registered"
            );
        }

        Ok(Self { routes })
    }

    /// Find the route for a request.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|entry| entry.pattern.matches(path).map(|params| RouteMatch { entry, params }))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    /// Distinct operation names in the table.
    pub fn names(&self) -> HashSet<&'static str> {
        self.routes.iter().map(|r| r.name).collect()
    }
}
