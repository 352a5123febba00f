//! Core identifier newtypes with smart constructors.
//!
//! Identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a grid, unique across all grids sharing one layout store.
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridName(String);

impl GridName {
    /// Smart constructor: validates non-empty, non-whitespace grid name.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidGridName> {
        let s = raw.into();
        if s.trim().is_empty() {
            Err(InvalidGridName::Empty)
        } else {
            Ok(Self(s))
        }
    }

    /// Borrow the raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GridName {
    type Error = InvalidGridName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GridName> for String {
    fn from(name: GridName) -> Self {
        name.0
    }
}

// ===== Error Types =====

/// Why a grid name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGridName {
    /// Empty or whitespace-only.
    #[error("Grid name cannot be empty")]
    Empty,
}

// ===== Tests =====
