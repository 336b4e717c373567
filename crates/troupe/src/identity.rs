//! # Cluster Identity
//!
//! A grain is addressed by the pair (identity, kind) rather than by the process
//! currently hosting it. The same identity string may be used by several kinds
//! without the activations colliding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location-independent name of a grain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterIdentity {
    identity: String,
    kind: String,
}

impl ClusterIdentity {
    /// Creates a new identity for `identity` within `kind`.
    pub fn new(identity: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            kind: kind.into(),
        }
    }

    /// Returns the logical identity component.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the registered kind name.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_identity_in_different_kinds_does_not_collide() {
        let mut set = HashSet::new();
        set.insert(ClusterIdentity::new("user-1", "Hello"));
        set.insert(ClusterIdentity::new("user-1", "Goodbye"));
        set.insert(ClusterIdentity::new("user-1", "Hello"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_is_kind_then_identity() {
        let identity = ClusterIdentity::new("user-1", "Hello");
        assert_eq!(identity.to_string(), "Hello/user-1");
        assert_eq!(identity.identity(), "user-1");
        assert_eq!(identity.kind(), "Hello");
    }
}
