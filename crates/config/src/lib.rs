//! Configuration loading, validation, and env substitution.
//!
//! Config files: `skilldeck.toml`, `skilldeck.yaml`, or `skilldeck.json`
//! Searched in `./` then `~/.config/skilldeck/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        clear_config_dir, config_dir, discover_and_load, find_config_file, load_config,
        set_config_dir,
    },
    schema::{CatalogConfig, InstallerConfig, SkillsConfig, SkilldeckConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
