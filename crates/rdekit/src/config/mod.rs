pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, load_config_from_str, ConfigFormat};
pub use schema::{
    Config, LoggingSettings, MultiDataTileSettings, SmartTableSettings, SystemSettings,
};
