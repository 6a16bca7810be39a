//! Cache Key Module
//!
//! Keys compare arguments by value: they are serialized with serde_json, so two
//! calls with structurally equal arguments land on the same entry.

use std::fmt;

use serde::Serialize;

use crate::error::CacheError;

// == Cache Key ==
/// Identifies a cached call by function identity and serialized arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: &'static str,
    args: String,
}

impl CacheKey {
    /// Builds the key for `name` called with `args`.
    ///
    /// Argument types with unordered fields (e.g. `HashMap`) serialize
    /// nondeterministically and should not be used as cache arguments.
    pub fn new<A: Serialize + ?Sized>(name: &'static str, args: &A) -> Result<Self, CacheError> {
        let args = serde_json::to_string(args)
            .map_err(|e| CacheError::KeySerialization(name, e.to_string()))?;
        Ok(Self { name, args })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.args)
    }
}
