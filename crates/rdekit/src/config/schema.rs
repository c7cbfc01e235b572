use serde::{Deserialize, Serialize};

/// Effective configuration for one structuring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemSettings,
    #[serde(default, alias = "multidataTile", alias = "multidatatile")]
    pub multidata_tile: MultiDataTileSettings,
    #[serde(default, alias = "smartTable")]
    pub smarttable: SmartTableSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    /// The configured extended mode, `None` when unset or blank.
    pub fn extended_mode(&self) -> Option<&str> {
        self.system
            .extended_mode
            .as_deref()
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default, alias = "extendedMode")]
    pub extended_mode: Option<String>,
    #[serde(default = "default_true", alias = "saveRaw")]
    pub save_raw: bool,
    #[serde(default = "default_true", alias = "saveNonsharedRaw")]
    pub save_nonshared_raw: bool,
    #[serde(default, alias = "saveThumbnailImage")]
    pub save_thumbnail_image: bool,
    #[serde(default, alias = "magicVariable")]
    pub magic_variable: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            extended_mode: None,
            save_raw: true,
            save_nonshared_raw: true,
            save_thumbnail_image: false,
            magic_variable: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiDataTileSettings {
    #[serde(default, alias = "ignoreErrors")]
    pub ignore_errors: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartTableSettings {
    #[serde(default, alias = "saveTableFile")]
    pub save_table_file: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
