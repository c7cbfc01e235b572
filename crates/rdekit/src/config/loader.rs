use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

/// File names probed by [`find_config`], in order.
const CONFIG_FILE_NAMES: &[&str] = &["rdeconfig.yaml", "rdeconfig.yml", "rdeconfig.json"];

const KNOWN_EXTENDED_MODES: &[&str] = &["rdeformat", "multidatatile"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content, ConfigFormat::from_path(path))
}

pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    // An empty YAML document is a valid "all defaults" config.
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

/// Looks for a config file inside `directory` (usually tasksupport).
///
/// Returns the defaults when no file is present, so a run without any
/// configuration behaves like plain invoice mode.
pub fn find_config<P: AsRef<Path>>(directory: P) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let directory = directory.as_ref();
    for name in CONFIG_FILE_NAMES {
        let candidate = directory.join(name);
        if candidate.is_file() {
            let config = load_config(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }
    Ok((Config::default(), None))
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(mode) = config.extended_mode() {
        let lowered = mode.to_lowercase();
        if !KNOWN_EXTENDED_MODES.contains(&lowered.as_str()) {
            return Err(ConfigError::Validation {
                message: format!(
                    "Unsupported extended_mode '{}', expected one of: rdeformat, MultiDataTile",
                    mode
                ),
            });
        }
    }

    if tracing_subscriber::EnvFilter::try_new(&config.logging.level).is_err() {
        return Err(ConfigError::Validation {
            message: format!("Invalid logging level '{}'", config.logging.level),
        });
    }

    Ok(())
}
