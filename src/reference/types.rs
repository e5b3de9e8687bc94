use std::path::PathBuf;
use thiserror::Error;

/// A photographer entry (`Full name;Namecode`)
#[derive(Debug, Clone, PartialEq)]
pub struct Photographer {
    pub full_name: String,
    pub code: String,
}

/// A dive site entry
#[derive(Debug, Clone, PartialEq)]
pub struct DiveSite {
    pub area: String,
    pub site: String,
    /// Site string used in filenames, e.g. "IDN-Bangka-HRS"
    pub code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DiveSite {
    /// "Area, Site" form shown to users
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.area, self.site)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// A species catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesEntry {
    pub family: String,
    pub genus: String,
    pub species: String,
    pub english: String,
}

/// Categories of the labels file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelCategory {
    Phase,
    Colour,
    Behaviour,
    Camera,
}

impl LabelCategory {
    pub fn key(&self) -> &'static str {
        match self {
            LabelCategory::Phase => "Phase",
            LabelCategory::Colour => "Colour",
            LabelCategory::Behaviour => "Behaviour",
            LabelCategory::Camera => "Camera",
        }
    }
}

/// Result of looking up a code in a label category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStatus {
    Known,
    Unknown,
    /// The category was not loaded, so the code cannot be checked
    Unavailable,
}

/// Read-only lookups the validator and pipeline need
pub trait ReferenceLookup {
    fn photographer(&self, code: &str) -> Option<&Photographer>;
    fn site(&self, code: &str) -> Option<&DiveSite>;
    fn has_activity(&self, code: &str) -> bool;
    fn has_species(&self, family: &str, genus: &str, species: &str) -> bool;
    fn label(&self, category: LabelCategory, code: &str) -> LabelStatus;
}

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Reference file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Table {path} lacks required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
}
