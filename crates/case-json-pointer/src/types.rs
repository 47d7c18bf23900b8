//! Type definitions for JSON Pointer paths and lookups.

/// A single unescaped path segment: an object key or a sequence index.
pub type PathStep = String;

/// A JSON Pointer path. The empty path addresses the root.
pub type Path = Vec<PathStep>;

/// Outcome of walking a path through a document.
///
/// Navigation never panics and never treats a miss as an error on its own:
/// the caller decides whether `NotFound` or `WrongKind` is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Every segment resolved.
    Found(T),
    /// The segment at `depth` names a key or index that does not exist.
    NotFound { depth: usize },
    /// The value reached before `depth` cannot be indexed by that segment:
    /// a scalar, or a sequence addressed by a non-index segment.
    WrongKind { depth: usize },
}

impl<T> Lookup<T> {
    /// Returns the found value, discarding miss details.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Maps the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound { depth } => Lookup::NotFound { depth },
            Lookup::WrongKind { depth } => Lookup::WrongKind { depth },
        }
    }
}
