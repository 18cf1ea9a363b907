//! Configuration surface: settings the loops read each tick and the auto-eat catalog.

pub mod settings;
pub mod store;

pub use settings::{ClickType, RunMode, Settings, SharedSettings};
pub use store::{
    CATALOG_FILE, ConfigError, ConfigResult, SETTINGS_FILE, config_dir, load_catalog,
    load_settings, save_settings,
};
