//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    default_store_dir, load_config_file, load_config_with_precedence, merge_config, ConfigError,
    ConfigFile, FiltersSection, ResolvedConfig,
};

use crate::model::OperatorCode;

/// Filter behaviour settings shared by every grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    /// Operators offered when a column declares no restriction.
    pub default_operators: Vec<OperatorCode>,

    /// Operators that cannot be ANDed with themselves.
    ///
    /// When both condition slots use the same operator from this set, the
    /// AND option is disabled and the join is forced to OR.
    pub cannot_and_operators: Vec<OperatorCode>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            default_operators: OperatorCode::ALL.to_vec(),
            cannot_and_operators: vec![
                OperatorCode::Equals,
                OperatorCode::BeginsWith,
                OperatorCode::EndsWith,
            ],
        }
    }
}
