//! Repository identifiers.

use serde::Serialize;
use std::fmt;

/// A repository on one platform instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Repository {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl Repository {
    /// Creates a repository identifier.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A source repository and the destination it is replayed onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryPair {
    /// Repository migrated from.
    pub source: Repository,

    /// Repository migrated to.
    pub destination: Repository,
}

impl fmt::Display for RepositoryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
