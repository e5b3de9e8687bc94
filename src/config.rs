use crate::reference::ReferencePaths;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable names
pub const ENV_DATA_DIR: &str = "FISHRENAME_DATA_DIR";
pub const ENV_LOCATION: &str = "FISHRENAME_LOCATION";
pub const ENV_EXIFTOOL: &str = "FISHRENAME_EXIFTOOL";
pub const ENV_SPECIES_FILE: &str = "FISHRENAME_SPECIES_FILE";
pub const ENV_PHOTOGRAPHERS_FILE: &str = "FISHRENAME_PHOTOGRAPHERS_FILE";
pub const ENV_DIVESITES_FILE: &str = "FISHRENAME_DIVESITES_FILE";
pub const ENV_ACTIVITIES_FILE: &str = "FISHRENAME_ACTIVITIES_FILE";
pub const ENV_LABELS_FILE: &str = "FISHRENAME_LABELS_FILE";

pub const DEFAULT_SPECIES_FILE: &str = "Species_Indopacific 2025-04-15.csv";
pub const DEFAULT_PHOTOGRAPHERS_FILE: &str = "Photographers_all 2025-04-15.csv";
pub const DEFAULT_DIVESITES_FILE: &str = "Divesites_Indopacific 2025-04-15.csv";
pub const DEFAULT_ACTIVITIES_FILE: &str = "Activities.csv";
pub const DEFAULT_LABELS_FILE: &str = "Labels 2025-04-15.json";
pub const DEFAULT_EXIFTOOL: &str = "exiftool";

const DATA_DIR_NAME: &str = "fishrename";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No data directory configured and no platform data directory available")]
    NoDataDir,

    #[error("Data directory is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Location column used to filter species and dive sites
    pub location: Option<String>,
    pub exiftool: PathBuf,
    species_file: String,
    photographers_file: String,
    divesites_file: String,
    activities_file: String,
    labels_file: String,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            location: None,
            exiftool: PathBuf::from(DEFAULT_EXIFTOOL),
            species_file: DEFAULT_SPECIES_FILE.to_string(),
            photographers_file: DEFAULT_PHOTOGRAPHERS_FILE.to_string(),
            divesites_file: DEFAULT_DIVESITES_FILE.to_string(),
            activities_file: DEFAULT_ACTIVITIES_FILE.to_string(),
            labels_file: DEFAULT_LABELS_FILE.to_string(),
        }
    }

    /// Apply command-line values, which win over the environment
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, location: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(location) = location {
            self.location = Some(location).filter(|l| !l.is_empty());
        }
        self
    }

    /// Resolved paths of all reference files
    pub fn reference_paths(&self) -> ReferencePaths {
        ReferencePaths {
            species: self.resolve(&self.species_file),
            photographers: self.resolve(&self.photographers_file),
            divesites: self.resolve(&self.divesites_file),
            activities: self.resolve(&self.activities_file),
            labels: self.resolve(&self.labels_file),
        }
    }

    /// Fail early when the data directory exists but is a file
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory(self.data_dir.clone()));
        }
        Ok(())
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load configuration from environment variables
///
/// - `FISHRENAME_DATA_DIR`: directory holding the reference files
///   (defaults to the platform data directory)
/// - `FISHRENAME_LOCATION`: location filter for species and sites
/// - `FISHRENAME_EXIFTOOL`: path of the exiftool binary
/// - `FISHRENAME_*_FILE`: per-table file names, relative to the data directory
///
/// These can be set in a `.env` file in the working directory.
pub fn config_from_env() -> Result<Config, ConfigError> {
    let data_dir = non_empty_var(ENV_DATA_DIR)
        .map(PathBuf::from)
        .or_else(default_data_dir)
        .ok_or(ConfigError::NoDataDir)?;

    let mut config = Config::new(data_dir);
    config.location = non_empty_var(ENV_LOCATION);

    if let Some(exiftool) = non_empty_var(ENV_EXIFTOOL) {
        config.exiftool = PathBuf::from(exiftool);
    }

    let overrides = [
        (ENV_SPECIES_FILE, &mut config.species_file),
        (ENV_PHOTOGRAPHERS_FILE, &mut config.photographers_file),
        (ENV_DIVESITES_FILE, &mut config.divesites_file),
        (ENV_ACTIVITIES_FILE, &mut config.activities_file),
        (ENV_LABELS_FILE, &mut config.labels_file),
    ];
    for (name, slot) in overrides {
        if let Some(value) = non_empty_var(name) {
            *slot = value;
        }
    }

    debug!(?config, "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env var tests share process-global state
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 8] = [
        ENV_DATA_DIR,
        ENV_LOCATION,
        ENV_EXIFTOOL,
        ENV_SPECIES_FILE,
        ENV_PHOTOGRAPHERS_FILE,
        ENV_DIVESITES_FILE,
        ENV_ACTIVITIES_FILE,
        ENV_LABELS_FILE,
    ];

    fn clear_env() {
        for name in ALL_VARS {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_config_from_env_with_values() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        env::set_var(ENV_DATA_DIR, "/data/fish");
        env::set_var(ENV_LOCATION, "Bangka");
        env::set_var(ENV_EXIFTOOL, "/opt/exiftool");
        env::set_var(ENV_SPECIES_FILE, "Species_Bangka.csv");

        let config = config_from_env().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/data/fish"));
        assert_eq!(config.location.as_deref(), Some("Bangka"));
        assert_eq!(config.exiftool, PathBuf::from("/opt/exiftool"));

        let paths = config.reference_paths();
        assert_eq!(paths.species, PathBuf::from("/data/fish/Species_Bangka.csv"));
        assert_eq!(paths.activities, PathBuf::from("/data/fish/Activities.csv"));

        clear_env();
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        env::set_var(ENV_DATA_DIR, "/data/fish");
        env::set_var(ENV_LOCATION, "  ");

        let config = config_from_env().unwrap();
        assert!(config.location.is_none());
        assert_eq!(config.exiftool, PathBuf::from(DEFAULT_EXIFTOOL));

        clear_env();
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::new("/env/dir").with_overrides(
            Some(PathBuf::from("/cli/dir")),
            Some("Red Sea".to_string()),
        );
        assert_eq!(config.data_dir, PathBuf::from("/cli/dir"));
        assert_eq!(config.location.as_deref(), Some("Red Sea"));

        let config = config.with_overrides(None, Some(String::new()));
        assert_eq!(config.data_dir, PathBuf::from("/cli/dir"));
        assert!(config.location.is_none());
    }

    #[test]
    fn test_absolute_file_names_are_kept() {
        let mut config = Config::new("/data");
        config.labels_file = "/elsewhere/labels.json".to_string();
        assert_eq!(
            config.reference_paths().labels,
            PathBuf::from("/elsewhere/labels.json")
        );
    }

    #[test]
    fn test_check_rejects_file_as_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        assert!(matches!(
            Config::new(&file).check(),
            Err(ConfigError::NotADirectory(_))
        ));
        assert!(Config::new(dir.path()).check().is_ok());
    }
}
