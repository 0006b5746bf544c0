use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use common::{find_column, SortState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Used when a bare job id is given instead of a page URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String { common::DEFAULT_BASE_URL.to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
    pub output: Option<PathBuf>,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "text".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA zone for message times in the status log
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_superscript_gm")]
    pub superscript_gm: bool,
}

fn default_timezone() -> String { "UTC".to_string() }
fn default_superscript_gm() -> bool { true }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            superscript_gm: default_superscript_gm(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_sort() -> String { common::DEFAULT_SORT_COLUMN.to_string() }
fn default_ascending() -> bool { true }

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
            ascending: default_ascending(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub table: TableConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Detect file type by extension and load
    pub fn from_file(path: &Path) -> Result<Self> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "toml" => Self::from_toml_file(path),
            _ => Err(anyhow!("Unsupported config file format. Use .yaml, .yml, or .toml")),
        }
    }

    /// The base is `$JOBDASH_CONFIG`, else the user config file if it exists,
    /// else the defaults. A `--config` file is merged over that base.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_base()?;
        if let Some(path) = explicit {
            config.merge(Self::from_file(path)?);
        }
        Ok(config)
    }

    fn load_base() -> Result<Self> {
        if let Ok(path) = std::env::var(common::CONFIG_ENV) {
            return Self::from_file(&expand_home(&path));
        }
        let user = expand_home(common::DEFAULT_CONFIG_PATH);
        if user.exists() {
            return Self::from_file(&user);
        }
        Ok(Self::default())
    }

    /// Overlays `other`. Fields `other` leaves at their default keep the
    /// value they already had.
    pub fn merge(&mut self, other: Config) {
        // Server settings
        overlay(&mut self.server.base_url, other.server.base_url, default_base_url());

        // Logging settings
        overlay(&mut self.logging.level, other.logging.level, default_log_level());
        overlay(&mut self.logging.format, other.logging.format, default_log_format());
        if other.logging.output.is_some() {
            self.logging.output = other.logging.output;
        }

        // Display settings
        overlay(&mut self.display.timezone, other.display.timezone, default_timezone());
        overlay(&mut self.display.superscript_gm, other.display.superscript_gm, default_superscript_gm());

        // Table settings
        overlay(&mut self.table.sort, other.table.sort, default_sort());
        overlay(&mut self.table.ascending, other.table.ascending, default_ascending());
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.display.timezone.parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", self.display.timezone, e))
    }

    pub fn sort_state(&self) -> Result<SortState> {
        let column = find_column(&self.table.sort)
            .ok_or_else(|| anyhow!("Unknown sort column in config: {}", self.table.sort))?;
        Ok(SortState {
            column: column.name.to_string(),
            ascending: self.table.ascending,
        })
    }
}

fn overlay<T: PartialEq>(field: &mut T, value: T, default: T) {
    if value != default {
        *field = value;
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => Path::new(&home).join(rest),
        _ => PathBuf::from(path),
    }
}
