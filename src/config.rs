use crate::data_provider::DownloadArgs;
use crate::earth_osm::{CapabilityMode, DEFAULT_COMMAND};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_file: String,
    pub historical_data: HistoricalDataConfig,
    pub download: DownloadConfig,
}

/// The `[historical_data]` section
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HistoricalDataConfig {
    /// Date of the OSM snapshot to fetch, `YYYY-MM-DD`; absent means latest
    #[serde(deserialize_with = "deserialize_osm_date")]
    pub osm_date: Option<String>,
}

/// The `[download]` section
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DownloadConfig {
    pub command: String,
    pub capability: CapabilityMode,
    pub primary_name: String,
    pub regions: Vec<String>,
    pub features: Vec<String>,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub out_format: Vec<String>,
    pub out_aggregate: bool,
    pub update: bool,
    pub parallel: bool,
}

/// Deserialize `osm_date` from either a quoted string or a bare TOML date.
///
/// Any other value is kept as its TOML text so the date validator rejects it
/// later instead of the whole config failing to load.
fn deserialize_osm_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<toml::Value> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        toml::Value::String(s) => s,
        toml::Value::Datetime(dt) => match (dt.date, dt.time, dt.offset) {
            (Some(date), None, None) => {
                format!("{:04}-{:02}-{:02}", date.year, date.month, date.day)
            }
            _ => dt.to_string(),
        },
        other => other.to_string(),
    }))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            log_file: "-".to_string(),
            historical_data: HistoricalDataConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        DownloadConfig {
            command: DEFAULT_COMMAND.to_string(),
            capability: CapabilityMode::Auto,
            primary_name: "power".to_string(),
            regions: Vec::new(),
            features: ["substation", "line", "cable", "generator", "tower"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            data_dir: PathBuf::from("data/osm"),
            out_dir: PathBuf::from("resources/osm"),
            out_format: vec!["csv".to_string(), "geojson".to_string()],
            out_aggregate: true,
            update: false,
            parallel: true,
        }
    }
}

impl DownloadConfig {
    /// Download arguments from this section, minus any historical date
    pub fn to_args(&self) -> DownloadArgs {
        DownloadArgs {
            primary_name: self.primary_name.clone(),
            regions: self.regions.clone(),
            features: self.features.clone(),
            data_dir: self.data_dir.clone(),
            out_dir: self.out_dir.clone(),
            out_format: self.out_format.clone(),
            out_aggregate: self.out_aggregate,
            update: self.update,
            parallel: self.parallel,
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    let pgm = env!("CARGO_PKG_NAME");
    let xdg_dirs = BaseDirectories::with_prefix(pgm);
    let config_home = xdg_dirs.get_config_home()?;
    Some(config_home.join("config.toml"))
}

/// Read the config from the XDG location, falling back to defaults on any problem
pub fn read() -> Config {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => return Config::default(),
    };

    // Check if file exists
    if !config_path.exists() {
        return Config::default();
    }

    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };

    toml::from_str(&content).unwrap_or_else(|_| Config::default())
}

/// Read an explicitly named config file. Unlike [`read`], problems are errors.
pub fn read_from(path: &Path) -> Result<Config, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Load from `--config` when given, otherwise from the XDG location
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => read_from(path),
        None => Ok(read()),
    }
}
