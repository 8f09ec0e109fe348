//! Data models: the configuration model and the tool settings

pub mod categories;
pub mod config_model;
pub mod keys;
pub mod settings;
pub mod value;

// Re-export main model types
pub use categories::{DiscoveryConf, ExportConf, SystemConf, WifiBand, WifiConf, WifiMode};
pub use config_model::{clamp_discovery_port, clamp_domain_id, clamp_server_id, ConfigModel, SetOutcome};
pub use keys::{Category, ConfigKey, DiscoveryKey, ExportKey, SystemKey, WifiKey};
pub use settings::{ConfigPaths, Settings};
pub use value::ConfigValue;
