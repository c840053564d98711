use std::{cmp::Ordering, time::SystemTime};

use tokio_util::sync::CancellationToken;

use crate::{
    error::{Error, Result},
    parse::{self, SKILL_FILE},
    paths::SkillPaths,
    scan::{SkillScanner, millis_since_epoch},
    types::{InstalledSkill, RegistrySnapshot, SkillDocument},
};

/// Read-only view over the skills installed on this machine.
///
/// Every call rescans the filesystem; nothing is cached between calls.
pub struct LocalSkillRegistry<S> {
    scanner: S,
}

impl<S: SkillScanner> LocalSkillRegistry<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }

    pub fn paths(&self) -> &SkillPaths {
        self.scanner.paths()
    }

    /// Scan and build a fresh snapshot, most recently created skill first.
    pub async fn assemble(&self) -> RegistrySnapshot {
        self.assemble_with(&CancellationToken::new()).await
    }

    /// Like [`assemble`](Self::assemble), stopping early once `cancel` fires.
    pub async fn assemble_with(&self, cancel: &CancellationToken) -> RegistrySnapshot {
        let mut skills: Vec<InstalledSkill> = self
            .scanner
            .scan(cancel)
            .await
            .into_iter()
            .map(InstalledSkill::from)
            .collect();
        sort_skills(&mut skills);

        tracing::debug!(count = skills.len(), "assembled skill registry");
        RegistrySnapshot::new(skills, millis_since_epoch(SystemTime::now()))
    }

    /// Load a skill's record together with its document body.
    pub async fn load_skill(&self, directory_name: &str) -> Result<SkillDocument> {
        let snapshot = self.assemble().await;
        let skill = snapshot
            .find(directory_name)
            .cloned()
            .ok_or_else(|| Error::skill_not_found(directory_name))?;

        let content = tokio::fs::read_to_string(skill.canonical_path.join(SKILL_FILE)).await?;
        let body = parse::parse(&content).body;
        Ok(SkillDocument { skill, body })
    }
}

/// Newest first; ties broken by directory name so output is deterministic.
pub fn sort_skills(skills: &mut [InstalledSkill]) {
    skills.sort_by(compare_recency);
}

fn compare_recency(a: &InstalledSkill, b: &InstalledSkill) -> Ordering {
    b.first_seen_at_ms
        .cmp(&a.first_seen_at_ms)
        .then_with(|| a.directory_name.cmp(&b.directory_name))
}
