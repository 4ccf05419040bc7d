//! Configuration loading and data root resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data root folder
pub const ROOT_ENV_VAR: &str = "COREFBOARD_ROOT";

/// Resolve the data root folder in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `COREFBOARD_ROOT` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_root(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_root()
}

/// Get the platform configuration file path, if one exists
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("corefboard").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    let system_config = PathBuf::from("/etc/corefboard/config.toml");
    if system_config.exists() {
        return Ok(system_config);
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data root folder
fn default_data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("corefboard"))
        .unwrap_or_else(|| PathBuf::from("./corefboard_data"))
}

/// Directory layout under the data root.
///
/// Uploaded prediction files, gold datasets and the external scorer
/// each live under a fixed subdirectory of the resolved root.
#[derive(Debug, Clone)]
pub struct DataDirs {
    pub root: PathBuf,
    pub uploads: PathBuf,
    pub gold_datasets: PathBuf,
    pub scorer: PathBuf,
}

impl DataDirs {
    /// Build the layout under `root` and create any missing directories
    pub fn ensure(root: PathBuf) -> Result<Self> {
        let dirs = Self {
            uploads: root.join("uploads"),
            gold_datasets: root.join("gold_datasets"),
            scorer: root.join("scorer"),
            root,
        };

        std::fs::create_dir_all(&dirs.root)?;
        std::fs::create_dir_all(&dirs.uploads)?;
        std::fs::create_dir_all(&dirs.gold_datasets)?;
        std::fs::create_dir_all(&dirs.scorer)?;

        Ok(dirs)
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.root.join("corefboard.db")
    }

    /// Directory holding gold dataset files for one language
    pub fn gold_dataset_dir(&self, language_id: i64) -> PathBuf {
        self.gold_datasets.join(format!("lang_{}", language_id))
    }
}
