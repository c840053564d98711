use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::parse::SkillDescriptor;

// ── Agent locations ──────────────────────────────────────────────────────────

/// One coding agent's private skill directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLocation {
    pub display_name: String,
    pub root: PathBuf,
}

impl AgentLocation {
    pub fn new(display_name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            root: root.into(),
        }
    }
}

// ── Scanner output ───────────────────────────────────────────────────────────

/// One skill directory found by a scan, before it is turned into a record.
#[derive(Debug, Clone)]
pub struct ScannedSkill {
    /// Literal subdirectory name under the canonical root.
    pub directory_name: String,
    pub path: PathBuf,
    pub descriptor: SkillDescriptor,
    /// Creation time of the canonical directory, in ms since the Unix epoch.
    pub first_seen_at_ms: u64,
    /// Display names of agents with a same-named directory, in table order.
    pub linked_agents: Vec<String>,
}

// ── Registry records ─────────────────────────────────────────────────────────

/// An installed skill as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledSkill {
    /// Declared name, or the directory name when none is declared.
    pub canonical_name: String,
    #[serde(default)]
    pub description: String,
    /// Stable identifier and join key against every agent directory.
    pub directory_name: String,
    pub canonical_path: PathBuf,
    pub linked_agents: Vec<String>,
    pub first_seen_at_ms: u64,
}

impl InstalledSkill {
    pub fn is_linked_to(&self, agent: &str) -> bool {
        self.linked_agents.iter().any(|a| a == agent)
    }
}

impl From<ScannedSkill> for InstalledSkill {
    fn from(scanned: ScannedSkill) -> Self {
        let canonical_name = scanned
            .descriptor
            .declared_name()
            .unwrap_or(&scanned.directory_name)
            .to_string();
        let description = scanned
            .descriptor
            .declared_description()
            .unwrap_or_default()
            .to_string();
        Self {
            canonical_name,
            description,
            directory_name: scanned.directory_name,
            canonical_path: scanned.path,
            linked_agents: scanned.linked_agents,
            first_seen_at_ms: scanned.first_seen_at_ms,
        }
    }
}

/// Result of one registry scan. Never mutated after it is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    skills: Arc<[InstalledSkill]>,
    pub scanned_at_ms: u64,
}

impl RegistrySnapshot {
    pub fn new(skills: Vec<InstalledSkill>, scanned_at_ms: u64) -> Self {
        Self {
            skills: skills.into(),
            scanned_at_ms,
        }
    }

    /// Records, most recently created first.
    pub fn skills(&self) -> &[InstalledSkill] {
        &self.skills
    }

    pub fn find(&self, directory_name: &str) -> Option<&InstalledSkill> {
        self.skills
            .iter()
            .find(|s| s.directory_name == directory_name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// A skill record together with its document body, loaded on demand.
#[derive(Debug, Clone)]
pub struct SkillDocument {
    pub skill: InstalledSkill,
    pub body: String,
}
