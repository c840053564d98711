//! Config schema types (skill locations, catalog search, installer).
use serde::{Deserialize, Serialize};

/// Default catalog service queried by `skilldeck search`.
pub const DEFAULT_CATALOG_URL: &str = "https://skills.sh";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkilldeckConfig {
    pub skills: SkillsConfig,
    pub catalog: CatalogConfig,
    pub installer: InstallerConfig,
}

/// Where installed skills live on disk.
///
/// The per-agent directory table is fixed; only the home directory it is
/// resolved against and the canonical root can be overridden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Canonical shared skill directory. Defaults to `~/.agents/skills`.
    pub canonical_root: Option<String>,
    /// Home directory used to resolve the default locations.
    pub home_dir: Option<String>,
}

/// Remote skill catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Maximum number of results requested per search.
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.into(),
            limit: 20,
            timeout_secs: 10,
        }
    }
}

/// External installer invoked by `skilldeck add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub program: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: "npx".into(),
        }
    }
}
