//! Mount matching module
//!
//! Decides, without touching the filesystem, whether a request path belongs
//! to a static mount at all.

use crate::error::ConfigError;
use hyper::Method;

/// Split a request path into its non-empty segments
///
/// Segments are returned as received, still percent-encoded.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Mount prefix plus the `only` / `only_matching` rules
#[derive(Debug, Clone)]
pub struct MountFilter {
    prefix: Vec<String>,
    only: Vec<String>,
    only_matching: Vec<String>,
}

impl MountFilter {
    /// Build a filter for the mount point `at` (e.g. `/public`)
    pub fn new(
        at: &str,
        only: Vec<String>,
        only_matching: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if !at.starts_with('/') {
            return Err(ConfigError::InvalidMountPoint(at.to_string()));
        }
        Ok(Self {
            prefix: split_path(at).into_iter().map(String::from).collect(),
            only,
            only_matching,
        })
    }

    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    /// Segments left after removing the mount prefix
    ///
    /// Empty when `segments` does not start with the whole prefix.
    pub fn subset<'a, 'b>(&self, segments: &'a [&'b str]) -> &'a [&'b str] {
        if segments.len() < self.prefix.len() {
            return &[];
        }
        let (head, rest) = segments.split_at(self.prefix.len());
        if head.iter().zip(&self.prefix).all(|(s, p)| *s == p.as_str()) {
            rest
        } else {
            &[]
        }
    }

    /// Check the `only` rules against the first remaining segment
    pub fn allowed(&self, subset: &[&str]) -> bool {
        let Some(first) = subset.first() else {
            return false;
        };

        // No rules means serve everything under the mount
        if self.only.is_empty() && self.only_matching.is_empty() {
            return true;
        }

        self.only.iter().any(|exact| first == exact)
            || self.only_matching.iter().any(|prefix| first.starts_with(prefix.as_str()))
    }

    /// The segments to serve, or `None` when the request is not for this mount
    pub fn eligible<'a, 'b>(
        &self,
        method: &Method,
        segments: &'a [&'b str],
    ) -> Option<&'a [&'b str]> {
        if method != Method::GET && method != Method::HEAD {
            return None;
        }
        let subset = self.subset(segments);
        self.allowed(subset).then_some(subset)
    }
}
