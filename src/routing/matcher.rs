//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse patterns such as `/ue-contexts/:ueContextId/release`
//! - Match request paths segment by segment
//! - Capture `:name` segments verbatim (no decoding, no coercion)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A placeholder never matches an empty segment
//! - A trailing slash is significant: `/v1/` and `/v1` are different paths
//! - No regex to guarantee O(n) matching

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Rejected pattern text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError(pub String);

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path pattern '{}'", self.0)
    }
}

impl std::error::Error for PatternError {}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError(pattern.to_string()))?;

        let last = rest.split('/').count() - 1;
        let mut segments = Vec::new();
        for (index, segment) in rest.split('/').enumerate() {
            match segment.strip_prefix(':') {
                Some("") => return Err(PatternError(pattern.to_string())),
                Some(name) => segments.push(Segment::Param(name.to_string())),
                // Only the last segment may be empty (trailing slash).
                None if segment.is_empty() && index < last => return Err(PatternError(pattern.to_string())),
                None => segments.push(Segment::Literal(segment.to_string())),
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Match a request path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut params = HashMap::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Number of literal segments; more literals means a more specific pattern.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// The pattern with parameter names erased. Two patterns with the same
    /// shape match exactly the same paths.
    pub fn shape(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(literal) => format!("/{}", literal),
                Segment::Param(_) => "/:".to_string(),
            })
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
