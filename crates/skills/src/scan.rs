use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use {async_trait::async_trait, futures::future::join_all, tokio_util::sync::CancellationToken};

use crate::{
    parse::{self, SKILL_FILE},
    paths::SkillPaths,
    types::ScannedSkill,
};

/// Enumerates installed skills and their agent links.
#[async_trait]
pub trait SkillScanner: Send + Sync {
    /// Scan the canonical root. Per-entry failures are skipped, never
    /// returned. Order of the result is unspecified.
    async fn scan(&self, cancel: &CancellationToken) -> Vec<ScannedSkill>;

    fn paths(&self) -> &SkillPaths;
}

/// Filesystem-backed scanner.
pub struct FsSkillScanner {
    paths: SkillPaths,
}

impl FsSkillScanner {
    pub fn new(paths: SkillPaths) -> Self {
        Self { paths }
    }

    async fn scan_candidate(&self, skill_dir: PathBuf) -> Option<ScannedSkill> {
        let Some(directory_name) = skill_dir.file_name().and_then(|n| n.to_str()) else {
            tracing::debug!(path = %skill_dir.display(), "skipping non UTF-8 directory name");
            return None;
        };
        let directory_name = directory_name.to_string();

        let skill_md = skill_dir.join(SKILL_FILE);
        let content = match tokio::fs::read_to_string(&skill_md).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %skill_md.display(), error = %e, "failed to read SKILL.md");
                return None;
            },
        };
        let descriptor = parse::parse(&content);

        let first_seen_at_ms = match first_seen_at(&skill_dir).await {
            Ok(ms) => ms,
            Err(e) => {
                tracing::warn!(path = %skill_dir.display(), error = %e, "failed to read skill timestamp");
                return None;
            },
        };

        let linked_agents = self.linked_agents(&directory_name).await;

        Some(ScannedSkill {
            directory_name,
            path: skill_dir,
            descriptor,
            first_seen_at_ms,
            linked_agents,
        })
    }

    /// Live existence check against every agent root, collected in table order.
    async fn linked_agents(&self, directory_name: &str) -> Vec<String> {
        let checks = self.paths.agents().iter().map(|agent| {
            let path = self.paths.agent_path_for(agent, directory_name);
            async move { (agent, is_dir(&path).await) }
        });

        join_all(checks)
            .await
            .into_iter()
            .filter(|(_, linked)| *linked)
            .map(|(agent, _)| agent.display_name.clone())
            .collect()
    }
}

#[async_trait]
impl SkillScanner for FsSkillScanner {
    async fn scan(&self, cancel: &CancellationToken) -> Vec<ScannedSkill> {
        let root = self.paths.canonical_root();
        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(root = %root.display(), "canonical skill root does not exist");
                return Vec::new();
            },
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "failed to list canonical skill root");
                return Vec::new();
            },
        };

        let mut skills = Vec::new();
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(found = skills.len(), "skill scan cancelled");
                break;
            }

            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "stopped listing canonical skill root");
                    break;
                },
            };

            let skill_dir = entry.path();
            if !is_dir(&skill_dir).await {
                continue;
            }
            if let Some(skill) = self.scan_candidate(skill_dir).await {
                skills.push(skill);
            }
        }

        skills
    }

    fn paths(&self) -> &SkillPaths {
        &self.paths
    }
}

/// True when `path` resolves (following symlinks) to a directory.
async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Creation time in ms since the epoch, falling back to the modification
/// time on filesystems that do not record creation time.
async fn first_seen_at(path: &Path) -> std::io::Result<u64> {
    let meta = tokio::fs::metadata(path).await?;
    let time = match meta.created() {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::Unsupported => meta.modified()?,
        Err(e) => return Err(e),
    };
    Ok(millis_since_epoch(time))
}

pub(crate) fn millis_since_epoch(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
