//! Runtime configuration from the environment (and `.env`, loaded by `main`).

use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MODELS_DIR: &str = "models_store";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOG_FILE: &str = "logs/bike_demand.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `hourly.csv` and `daily.csv`.
    pub data_dir: PathBuf,
    /// Directory searched for model artifacts.
    pub models_dir: PathBuf,
    pub bind_addr: String,
    pub log_file_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Reads `BIKE_DATA_DIR`, `BIKE_MODELS_DIR`, `BIKE_BIND_ADDR` and
    /// `LOG_FILE_PATH`, falling back to the defaults for unset variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            data_dir: var("BIKE_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            models_dir: var("BIKE_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            bind_addr: var("BIKE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            log_file_path: var("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file_path),
        }
    }
}
