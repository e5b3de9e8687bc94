mod loader;
mod types;

pub use loader::{read_table, Table};
pub use types::*;

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Locations of the reference files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePaths {
    pub species: PathBuf,
    pub photographers: PathBuf,
    pub divesites: PathBuf,
    pub activities: PathBuf,
    pub labels: PathBuf,
}

/// All reference tables, loaded once and read-only afterwards
#[derive(Debug, Default)]
pub struct ReferenceData {
    pub photographers: Vec<Photographer>,
    pub sites: Vec<DiveSite>,
    pub activities: Vec<String>,
    pub species: Vec<SpeciesEntry>,
    pub labels: BTreeMap<String, BTreeMap<String, String>>,
    /// Location columns available for filtering
    pub locations: Vec<String>,
    /// Tables that could not be found
    pub missing: Vec<PathBuf>,
}

/// Absent tables are tolerated (lookups against them simply fail);
/// malformed ones are not.
fn optional<T: Default>(
    result: Result<T, ReferenceError>,
    missing: &mut Vec<PathBuf>,
) -> Result<T, ReferenceError> {
    match result {
        Ok(value) => Ok(value),
        Err(ReferenceError::NotFound(path)) => {
            warn!("Reference file not found: {:?}", path);
            missing.push(path);
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

impl ReferenceData {
    pub fn load(paths: &ReferencePaths, location: Option<&str>) -> Result<Self, ReferenceError> {
        let mut missing = Vec::new();

        let photographers = optional(loader::load_photographers(&paths.photographers), &mut missing)?;
        let sites = optional(loader::load_divesites(&paths.divesites, location), &mut missing)?;
        let activities = optional(loader::load_activities(&paths.activities), &mut missing)?;
        let (species, locations) =
            optional(loader::load_species(&paths.species, location), &mut missing)?;
        let labels = optional(loader::load_labels(&paths.labels), &mut missing)?;

        info!(
            photographers = photographers.len(),
            sites = sites.len(),
            activities = activities.len(),
            species = species.len(),
            label_categories = labels.len(),
            "Reference data loaded"
        );

        Ok(Self {
            photographers,
            sites,
            activities,
            species,
            labels,
            locations,
            missing,
        })
    }

    /// Resolve a photographer from a name code or a full name
    pub fn resolve_photographer(&self, input: &str) -> Option<&Photographer> {
        self.photographers
            .iter()
            .find(|p| p.code == input)
            .or_else(|| self.photographers.iter().find(|p| p.full_name == input))
    }

    /// Resolve a site from its site string or its "Area, Site" name
    pub fn resolve_site(&self, input: &str) -> Option<&DiveSite> {
        self.sites.iter().find(|s| s.code == input).or_else(|| {
            let (area, site) = input.split_once(", ")?;
            self.sites.iter().find(|s| s.area == area && s.site == site)
        })
    }

    /// Resolve a camera tag from its abbreviation or full model name
    pub fn resolve_camera(&self, input: &str) -> Option<String> {
        let cameras = self.labels.get(LabelCategory::Camera.key())?;
        if cameras.contains_key(input) {
            return Some(input.to_string());
        }
        cameras
            .iter()
            .find(|(_, name)| name.as_str() == input)
            .map(|(abbrev, _)| abbrev.clone())
    }

    /// Resolve a label code from its code or its display label
    pub fn resolve_label(&self, category: LabelCategory, input: &str) -> Option<String> {
        let labels = self.labels.get(category.key())?;
        if labels.contains_key(input) {
            return Some(input.to_string());
        }
        labels
            .iter()
            .find(|(_, label)| label.as_str() == input)
            .map(|(code, _)| code.clone())
    }

    /// Species whose columns contain every space-separated term,
    /// sorted by family, genus, species
    pub fn search_species(&self, query: &str) -> Vec<&SpeciesEntry> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        let mut matches: Vec<&SpeciesEntry> = self
            .species
            .iter()
            .filter(|entry| {
                let columns = [&entry.family, &entry.genus, &entry.species, &entry.english];
                terms.iter().all(|term| {
                    columns
                        .iter()
                        .any(|value| value.to_lowercase().contains(term.as_str()))
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            (&a.family, &a.genus, &a.species).cmp(&(&b.family, &b.genus, &b.species))
        });
        matches
    }
}

impl ReferenceLookup for ReferenceData {
    fn photographer(&self, code: &str) -> Option<&Photographer> {
        self.photographers.iter().find(|p| p.code == code)
    }

    fn site(&self, code: &str) -> Option<&DiveSite> {
        self.sites.iter().find(|s| s.code == code)
    }

    fn has_activity(&self, code: &str) -> bool {
        self.activities.iter().any(|a| a == code)
    }

    fn has_species(&self, family: &str, genus: &str, species: &str) -> bool {
        self.species
            .iter()
            .any(|e| e.family == family && e.genus == genus && e.species == species)
    }

    fn label(&self, category: LabelCategory, code: &str) -> LabelStatus {
        match self.labels.get(category.key()) {
            None => LabelStatus::Unavailable,
            Some(labels) if labels.contains_key(code) => LabelStatus::Known,
            Some(_) => LabelStatus::Unknown,
        }
    }
}
