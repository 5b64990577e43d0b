//! Cell identifiers and their metric labels.
//!
//! # Design Decisions
//! - `CellId` can only be built through `CellId::parse`, so a held value is
//!   always 1..=10 characters
//! - Membership in the registry is checked separately (see `registry.rs`)
//! - `CellTag` is what metrics see: never the raw inbound string

use std::fmt;
use serde::{Serialize, Serializer};

/// Maximum length of a cell identifier, in characters.
pub const MAX_CELL_ID_LEN: usize = 10;

/// Error returned when a string cannot be a cell identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellIdError {
    #[error("cellID must not be empty")]
    Empty,

    #[error("cellID must be at most {MAX_CELL_ID_LEN} characters (got {0})")]
    TooLong(usize),
}

/// A syntactically valid cell identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(String);

impl CellId {
    /// Validate the length constraints and wrap the value.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CellIdError> {
        let raw = raw.into();
        let len = raw.chars().count();
        if len == 0 {
            return Err(CellIdError::Empty);
        }
        if len > MAX_CELL_ID_LEN {
            return Err(CellIdError::TooLong(len));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Cell dimension of a metric sample.
///
/// Only configured cells appear by name; everything else collapses into one
/// of two fixed buckets so label cardinality stays bounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellTag {
    /// No cell involved (non-dispatch endpoints, missing or empty cellID).
    #[default]
    None,
    /// A cellID was supplied but is not a configured cell.
    Invalid,
    /// A configured cell.
    Cell(CellId),
}

impl CellTag {
    pub fn label(&self) -> String {
        match self {
            CellTag::None => "none".to_string(),
            CellTag::Invalid => "invalid".to_string(),
            CellTag::Cell(id) => id.to_string(),
        }
    }
}
