use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::SkilldeckConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skilldeck.toml",
    "skilldeck.yaml",
    "skilldeck.yml",
    "skilldeck.json",
];

static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Override the user-global config directory (e.g. from `--config-dir`).
pub fn set_config_dir(dir: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.write() {
        *guard = Some(dir);
    }
}

/// Drop a previous [`set_config_dir`] override.
pub fn clear_config_dir() {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.write() {
        *guard = None;
    }
}

/// Returns the user-global config directory (`~/.config/skilldeck/`), or the
/// override set with [`set_config_dir`].
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(guard) = CONFIG_DIR_OVERRIDE.read()
        && let Some(dir) = guard.as_ref()
    {
        return Some(dir.clone());
    }
    directories::ProjectDirs::from("", "", "skilldeck").map(|d| d.config_dir().to_path_buf())
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<SkilldeckConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./skilldeck.{toml,yaml,yml,json}` (project-local)
/// 2. `<config dir>/skilldeck.{toml,yaml,yml,json}` (user-global)
///
/// Returns `SkilldeckConfig::default()` if no config file is found or the
/// file cannot be loaded.
pub fn discover_and_load() -> SkilldeckConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SkilldeckConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    find_in_dir(&dir)
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SkilldeckConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_format() {
        let tmp = tempfile::tempdir().unwrap();

        let toml_path = tmp.path().join("skilldeck.toml");
        std::fs::write(&toml_path, "[catalog]\nlimit = 7\n").unwrap();
        assert_eq!(load_config(&toml_path).unwrap().catalog.limit, 7);

        let yaml_path = tmp.path().join("skilldeck.yaml");
        std::fs::write(&yaml_path, "catalog:\n  limit: 8\n").unwrap();
        assert_eq!(load_config(&yaml_path).unwrap().catalog.limit, 8);

        let json_path = tmp.path().join("skilldeck.json");
        std::fs::write(&json_path, r#"{"catalog":{"limit":9}}"#).unwrap();
        assert_eq!(load_config(&json_path).unwrap().catalog.limit, 9);
    }

    #[test]
    fn rejects_unknown_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.ini");
        std::fs::write(&path, "limit=1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_config(&tmp.path().join("nope.toml")).is_err());
    }

    #[test]
    fn find_in_dir_prefers_toml() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("skilldeck.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("skilldeck.toml"), "").unwrap();
        assert_eq!(
            find_in_dir(tmp.path()),
            Some(tmp.path().join("skilldeck.toml"))
        );
    }
}
