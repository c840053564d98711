//! Canonical and per-agent skill locations. Pure lookups, no I/O.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {skilldeck_common::paths::expand_tilde, skilldeck_config::SkillsConfig};

use crate::{
    error::{Context, Result},
    types::AgentLocation,
};

/// Canonical root relative to the home directory.
pub const CANONICAL_ROOT: &str = ".agents/skills";

/// Supported agents and their skill directories relative to the home
/// directory, in display order.
pub const AGENT_TABLE: &[(&str, &str)] = &[
    ("Claude Code", ".claude/skills"),
    ("Cursor", ".cursor/skills"),
    ("Codex", ".codex/skills"),
    ("GitHub Copilot", ".copilot/skills"),
    ("Gemini CLI", ".gemini/skills"),
    ("OpenCode", ".config/opencode/skills"),
    ("Windsurf", ".codeium/windsurf/skills"),
    ("Goose", ".config/goose/skills"),
    ("Amp", ".config/agents/skills"),
];

/// Where skills live: one canonical root plus a fixed, ordered agent table.
#[derive(Debug, Clone)]
pub struct SkillPaths {
    canonical_root: PathBuf,
    agents: Arc<[AgentLocation]>,
}

impl SkillPaths {
    pub fn new(canonical_root: impl Into<PathBuf>, agents: Vec<AgentLocation>) -> Self {
        Self {
            canonical_root: canonical_root.into(),
            agents: agents.into(),
        }
    }

    /// Default layout resolved against `home`.
    pub fn for_home(home: &Path) -> Self {
        let agents = AGENT_TABLE
            .iter()
            .map(|(name, rel)| AgentLocation::new(*name, home.join(rel)))
            .collect();
        Self::new(home.join(CANONICAL_ROOT), agents)
    }

    /// Default layout with the overrides from `[skills]` applied.
    pub fn from_config(config: &SkillsConfig) -> Result<Self> {
        let home = match config.home_dir.as_deref() {
            Some(raw) => PathBuf::from(raw),
            None => directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .context("could not determine the home directory")?,
        };

        let mut paths = Self::for_home(&home);
        if let Some(raw) = config.canonical_root.as_deref() {
            paths.canonical_root = expand_tilde(raw, &home);
        }
        Ok(paths)
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    pub fn agents(&self) -> &[AgentLocation] {
        &self.agents
    }

    pub fn canonical_path_for(&self, directory_name: &str) -> PathBuf {
        self.canonical_root.join(directory_name)
    }

    pub fn agent_path_for(&self, agent: &AgentLocation, directory_name: &str) -> PathBuf {
        agent.root.join(directory_name)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_order() {
        let paths = SkillPaths::for_home(Path::new("/home/ada"));
        assert_eq!(paths.canonical_root(), Path::new("/home/ada/.agents/skills"));
        let names: Vec<&str> = paths
            .agents()
            .iter()
            .map(|a| a.display_name.as_str())
            .collect();
        assert_eq!(names[0], "Claude Code");
        assert_eq!(names[1], "Cursor");
        assert_eq!(names.len(), AGENT_TABLE.len());
        assert_eq!(paths.agents()[1].root, Path::new("/home/ada/.cursor/skills"));
    }

    #[test]
    fn joins_directory_names() {
        let paths = SkillPaths::new(
            "/canon",
            vec![AgentLocation::new("Cursor", "/agents/cursor")],
        );
        assert_eq!(paths.canonical_path_for("pdf"), Path::new("/canon/pdf"));
        assert_eq!(
            paths.agent_path_for(&paths.agents()[0], "pdf"),
            Path::new("/agents/cursor/pdf")
        );
    }

    #[test]
    fn config_overrides_apply() {
        let config = SkillsConfig {
            canonical_root: Some("~/shared/skills".into()),
            home_dir: Some("/home/grace".into()),
        };
        let paths = SkillPaths::from_config(&config).unwrap();
        assert_eq!(paths.canonical_root(), Path::new("/home/grace/shared/skills"));
        assert_eq!(
            paths.agents()[0].root,
            Path::new("/home/grace/.claude/skills")
        );
    }

    #[test]
    fn config_home_without_root_override() {
        let config = SkillsConfig {
            canonical_root: None,
            home_dir: Some("/home/grace".into()),
        };
        let paths = SkillPaths::from_config(&config).unwrap();
        assert_eq!(paths.canonical_root(), Path::new("/home/grace/.agents/skills"));
    }
}
