use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, trace};

use super::types::{DiveSite, Photographer, ReferenceError, SpeciesEntry};

/// Fixed species columns; every other column is a location flag
pub const SPECIES_COLUMNS: [&str; 4] = ["Family", "Genus", "Species", "Species English"];

/// A semicolon-separated table with named columns
#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl Table {
    /// Keep only rows flagged `1` for the location, when the table has that column
    pub fn filter_by_location(mut self, location: Option<&str>) -> Self {
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            if self.headers.iter().any(|h| h == location) {
                self.rows
                    .retain(|row| row.get(location).map(String::as_str) == Some("1"));
                debug!(location, rows = self.rows.len(), "Filtered table by location");
            }
        }
        self
    }

    fn require(&self, path: &Path, columns: &[&str]) -> Result<(), ReferenceError> {
        for column in columns {
            if !self.headers.iter().any(|h| h == column) {
                return Err(ReferenceError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn cell(row: &HashMap<String, String>, column: &str) -> String {
    row.get(column).cloned().unwrap_or_default()
}

pub fn read_table(path: &Path) -> Result<Table, ReferenceError> {
    if !path.exists() {
        return Err(ReferenceError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| ReferenceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    // Spreadsheet exports often start with a BOM
    let content = content.trim_start_matches('\u{feff}');

    let malformed = |e: csv::Error| ReferenceError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.trim().to_string()))
            .collect();
        trace!(?row, "Read row");
        rows.push(row);
    }

    debug!(path = ?path, rows = rows.len(), "Loaded table");
    Ok(Table { headers, rows })
}

pub fn load_photographers(path: &Path) -> Result<Vec<Photographer>, ReferenceError> {
    let table = read_table(path)?;
    table.require(path, &["Full name", "Namecode"])?;

    Ok(table
        .rows
        .iter()
        .map(|row| Photographer {
            full_name: cell(row, "Full name"),
            code: cell(row, "Namecode"),
        })
        .filter(|p| !p.code.is_empty())
        .collect())
}

pub fn load_divesites(path: &Path, location: Option<&str>) -> Result<Vec<DiveSite>, ReferenceError> {
    let table = read_table(path)?.filter_by_location(location);
    table.require(path, &["Area", "Site", "Site string"])?;

    Ok(table
        .rows
        .iter()
        .map(|row| DiveSite {
            area: cell(row, "Area"),
            site: cell(row, "Site"),
            code: cell(row, "Site string"),
            latitude: parse_coordinate(&cell(row, "latitude")),
            longitude: parse_coordinate(&cell(row, "longitude")),
        })
        .filter(|s| !s.code.is_empty())
        .collect())
}

/// Accepts both `1.5` and `1,5` decimal notation
fn parse_coordinate(value: &str) -> Option<f64> {
    value.replace(',', ".").parse().ok()
}

/// Species rows plus the location columns found in the file
pub fn load_species(
    path: &Path,
    location: Option<&str>,
) -> Result<(Vec<SpeciesEntry>, Vec<String>), ReferenceError> {
    let table = read_table(path)?;
    table.require(path, &SPECIES_COLUMNS[..3])?;

    let locations = table
        .headers
        .iter()
        .filter(|h| !SPECIES_COLUMNS.contains(&h.as_str()))
        .cloned()
        .collect();

    let table = table.filter_by_location(location);
    let entries = table
        .rows
        .iter()
        .map(|row| SpeciesEntry {
            family: cell(row, "Family"),
            genus: cell(row, "Genus"),
            species: cell(row, "Species"),
            english: cell(row, "Species English"),
        })
        .collect();

    Ok((entries, locations))
}

/// Activity codes from the first column
pub fn load_activities(path: &Path) -> Result<Vec<String>, ReferenceError> {
    let table = read_table(path)?;
    let Some(column) = table.headers.first() else {
        return Ok(Vec::new());
    };

    Ok(table
        .rows
        .iter()
        .map(|row| cell(row, column))
        .filter(|v| !v.is_empty())
        .collect())
}

/// Labels file: `{ "<category>": { "<code>": "<label>" } }`
pub fn load_labels(path: &Path) -> Result<BTreeMap<String, BTreeMap<String, String>>, ReferenceError> {
    if !path.exists() {
        return Err(ReferenceError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| ReferenceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| ReferenceError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
