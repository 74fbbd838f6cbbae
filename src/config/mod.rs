//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel, Strategy};
pub use validate::validate_and_normalize;
pub use xml::{load_config_from_xml, FileConfig};

/// Defaults shared across submodules.
pub const SOURCE_DEFAULT: &str = "src";
pub const DESTINATION_DEFAULT: &str = "dest";
pub const POLL_INTERVAL_DEFAULT: std::time::Duration = std::time::Duration::from_millis(100);
