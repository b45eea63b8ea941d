//! Cache key definitions.
//!
//! Public pages are identified by a logical `PagePath`. Invalidation names
//! either one page or a layout scope covering a page and everything beneath it.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A logical page path such as `/`, `/products` or `/dashboard/about-us`.
///
/// Always starts with `/` and never ends with one, except for the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PagePath(String);

impl PagePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Self("/".to_string());
        }
        if trimmed.starts_with('/') {
            Self(trimmed.to_string())
        } else {
            Self(format!("/{trimmed}"))
        }
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `self` equals `scope` or sits beneath it.
    pub fn is_within(&self, scope: &PagePath) -> bool {
        if scope.0 == "/" || self.0 == scope.0 {
            return true;
        }
        self.0
            .strip_prefix(scope.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a write makes stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvalidationTarget {
    /// Exactly one page.
    Exact(PagePath),
    /// A page and every page beneath it.
    Layout(PagePath),
}

impl InvalidationTarget {
    pub fn exact(path: impl AsRef<str>) -> Self {
        Self::Exact(PagePath::new(path))
    }

    pub fn layout(path: impl AsRef<str>) -> Self {
        Self::Layout(PagePath::new(path))
    }

    pub fn path(&self) -> &PagePath {
        match self {
            Self::Exact(path) | Self::Layout(path) => path,
        }
    }

    pub fn covers(&self, page: &PagePath) -> bool {
        match self {
            Self::Exact(path) => path == page,
            Self::Layout(scope) => page.is_within(scope),
        }
    }

    /// Whether invalidating `self` already invalidates everything `other` does.
    pub fn subsumes(&self, other: &InvalidationTarget) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Exact(_), Self::Layout(_)) => false,
            (Self::Layout(scope), other) => other.path().is_within(scope),
        }
    }
}

impl fmt::Display for InvalidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => write!(f, "{path}"),
            Self::Layout(path) => write!(f, "{path} (layout)"),
        }
    }
}

/// L1 response cache key: request path plus a hash of its query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct L1Key {
    pub path: String,
    pub query_hash: u64,
}

impl L1Key {
    pub fn new(path: impl Into<String>, query: &str) -> Self {
        Self {
            path: path.into(),
            query_hash: hash_query(query),
        }
    }
}

/// Compute a hash for any hashable value.
pub fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash a query string for L1 cache key generation.
pub fn hash_query(query: &str) -> u64 {
    hash_value(&query)
}
