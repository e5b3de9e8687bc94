use crate::fields::{Field, Mode};
use thiserror::Error;

/// Token delimiter inside a filename
pub const DELIMITER: char = '_';

/// Marker token for a confirmed GPS write
pub const GPS_MARKER: &str = "G";

/// Fixed token separating the identification group from the basic body
pub const ID_SEPARATOR: &str = "B";

pub const FAMILY_PLACEHOLDER: &str = "0-Fam";
pub const GENUS_PLACEHOLDER: &str = "genus";
pub const SPECIES_PLACEHOLDER: &str = "spec";
/// Rendered for an absent confidence, life stage, colour or behaviour
pub const UNSPECIFIED: &str = "zz";

/// Token counts of the layouts without the optional marker segment
pub const BASIC_TOKENS: usize = 6;
pub const IDENTIFY_TOKENS: usize = BASIC_TOKENS + 8;

/// Which fixed layout an existing filename follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Basic,
    Identified,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty filename")]
    Empty,

    #[error("{mode:?} name needs {min}-{max} tokens, found {found}: {name}")]
    TokenCount {
        mode: Mode,
        min: usize,
        max: usize,
        found: usize,
        name: String,
    },

    #[error("Token {position} ('{token}') is not a valid {field}: expected {expected}")]
    InvalidToken {
        position: usize,
        field: Field,
        token: String,
        expected: &'static str,
    },
}

impl ParseError {
    /// The slot that failed, when the error is tied to one
    pub fn field(&self) -> Option<Field> {
        match self {
            ParseError::InvalidToken { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("Cannot assemble {mode:?} name: {field} is not set")]
    MissingField { mode: Mode, field: Field },
}
