//! Removing a skill from the canonical root and every agent directory.
//!
//! Each location is attempted independently and reported on its own; a
//! target that is already gone counts as removed.

use std::{
    ffi::OsStr,
    fmt,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use {
    async_trait::async_trait,
    futures::future::join_all,
    tracing::{info, warn},
};

use crate::{paths::SkillPaths, types::InstalledSkill};

/// Which copy of a skill a removal targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalTarget {
    Canonical,
    Agent(String),
}

impl fmt::Display for RemovalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => write!(f, "shared skills directory"),
            Self::Agent(name) => write!(f, "{name}"),
        }
    }
}

/// A successful removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    AlreadyAbsent,
}

#[derive(Debug, thiserror::Error)]
pub enum RemovalError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("not a directory")]
    NotADirectory,
    #[error("invalid skill directory name")]
    InvalidName,
}

/// Result for one location.
#[derive(Debug)]
pub struct LocationOutcome {
    pub target: RemovalTarget,
    pub path: PathBuf,
    pub result: Result<Removal, RemovalError>,
}

impl LocationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate result of one uninstall: the canonical copy first, then every
/// agent in table order.
#[derive(Debug)]
pub struct UninstallOutcome {
    pub directory_name: String,
    pub locations: Vec<LocationOutcome>,
}

impl UninstallOutcome {
    /// True when every location was removed or already absent.
    pub fn is_success(&self) -> bool {
        self.locations.iter().all(LocationOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &LocationOutcome> {
        self.locations.iter().filter(|l| !l.is_success())
    }

    /// Locations where a copy was actually deleted.
    pub fn removed_from(&self) -> impl Iterator<Item = &RemovalTarget> {
        self.locations
            .iter()
            .filter(|l| matches!(l.result, Ok(Removal::Removed)))
            .map(|l| &l.target)
    }
}

impl fmt::Display for UninstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let removed: Vec<String> = self
            .removed_from()
            .filter(|t| matches!(t, RemovalTarget::Agent(_)))
            .map(ToString::to_string)
            .collect();
        let failed: Vec<String> = self
            .failures()
            .map(|l| match &l.result {
                Err(e) => format!("{}: {e}", l.target),
                Ok(_) => l.target.to_string(),
            })
            .collect();

        match (removed.is_empty(), failed.is_empty()) {
            (_, true) if removed.is_empty() => write!(f, "removed {}", self.directory_name),
            (_, true) => write!(
                f,
                "removed {} from {}",
                self.directory_name,
                join_names(&removed)
            ),
            (true, false) => write!(
                f,
                "failed to remove {}: {}",
                self.directory_name,
                failed.join("; ")
            ),
            (false, false) => write!(
                f,
                "removed {} from {} but failed for {}",
                self.directory_name,
                join_names(&removed),
                failed.join("; ")
            ),
        }
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Deletes one location on disk.
#[async_trait]
pub trait PathRemover: Send + Sync {
    async fn remove(&self, path: &Path) -> Result<Removal, RemovalError>;
}

/// Removes directories and symlinks on the local filesystem.
pub struct FsRemover;

#[async_trait]
impl PathRemover for FsRemover {
    async fn remove(&self, path: &Path) -> Result<Removal, RemovalError> {
        remove_path(path).await
    }
}

/// Removes one skill everywhere it is installed.
///
/// The caller is expected to have confirmed the action and to rescan the
/// registry afterwards.
pub struct UninstallCoordinator {
    paths: SkillPaths,
    remover: Arc<dyn PathRemover>,
}

impl UninstallCoordinator {
    pub fn new(paths: SkillPaths) -> Self {
        Self::with_remover(paths, Arc::new(FsRemover))
    }

    pub fn with_remover(paths: SkillPaths, remover: Arc<dyn PathRemover>) -> Self {
        Self { paths, remover }
    }

    pub async fn uninstall(&self, skill: &InstalledSkill) -> UninstallOutcome {
        let directory_name = &skill.directory_name;

        if !self.is_valid_target(skill) {
            warn!(
                skill = %directory_name,
                path = %skill.canonical_path.display(),
                "refusing to uninstall skill with an invalid location"
            );
            return self.rejected(skill);
        }

        let mut locations = Vec::with_capacity(1 + self.paths.agents().len());
        locations.push(
            self.remove_location(RemovalTarget::Canonical, skill.canonical_path.clone())
                .await,
        );

        let agent_removals = self.paths.agents().iter().map(|agent| {
            let path = self.paths.agent_path_for(agent, directory_name);
            self.remove_location(RemovalTarget::Agent(agent.display_name.clone()), path)
        });
        locations.extend(join_all(agent_removals).await);

        let outcome = UninstallOutcome {
            directory_name: directory_name.clone(),
            locations,
        };
        if outcome.is_success() {
            info!(skill = %directory_name, "uninstalled skill");
        } else {
            warn!(
                skill = %directory_name,
                failed = outcome.failures().count(),
                "skill uninstall incomplete"
            );
        }
        outcome
    }

    /// The directory name must be one plain path component and the canonical
    /// copy must sit directly under the canonical root.
    fn is_valid_target(&self, skill: &InstalledSkill) -> bool {
        is_single_component(&skill.directory_name)
            && skill.canonical_path.parent() == Some(self.paths.canonical_root())
            && skill.canonical_path.file_name() == Some(OsStr::new(&skill.directory_name))
    }

    /// Every location fails with [`RemovalError::InvalidName`]; nothing is touched.
    fn rejected(&self, skill: &InstalledSkill) -> UninstallOutcome {
        let canonical = LocationOutcome {
            target: RemovalTarget::Canonical,
            path: skill.canonical_path.clone(),
            result: Err(RemovalError::InvalidName),
        };
        let agents = self.paths.agents().iter().map(|agent| LocationOutcome {
            target: RemovalTarget::Agent(agent.display_name.clone()),
            path: agent.root.clone(),
            result: Err(RemovalError::InvalidName),
        });
        UninstallOutcome {
            directory_name: skill.directory_name.clone(),
            locations: std::iter::once(canonical).chain(agents).collect(),
        }
    }

    async fn remove_location(&self, target: RemovalTarget, path: PathBuf) -> LocationOutcome {
        let result = self.remover.remove(&path).await;
        match &result {
            Ok(Removal::Removed) => {
                info!(location = %target, path = %path.display(), "removed skill copy")
            },
            Ok(Removal::AlreadyAbsent) => {},
            Err(e) => {
                warn!(location = %target, path = %path.display(), error = %e, "failed to remove skill copy")
            },
        }
        LocationOutcome {
            target,
            path,
            result,
        }
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(first)), None) => first == OsStr::new(name),
        _ => false,
    }
}

/// Remove a directory or a symlink to one. Symlinks are unlinked without
/// touching their target. Missing paths are not an error.
async fn remove_path(path: &Path) -> Result<Removal, RemovalError> {
    let meta = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Removal::AlreadyAbsent),
        Err(e) => return Err(e.into()),
    };

    let file_type = meta.file_type();
    let removed = if file_type.is_symlink() {
        remove_symlink(path).await
    } else if file_type.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        return Err(RemovalError::NotADirectory);
    };

    match removed {
        Ok(()) => Ok(Removal::Removed),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Removal::AlreadyAbsent),
        Err(e) => Err(e.into()),
    }
}

async fn remove_symlink(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        // Directory symlinks on Windows must be removed as directories.
        Err(e) if cfg!(windows) && e.kind() != ErrorKind::NotFound => {
            tokio::fs::remove_dir(path).await
        },
        other => other,
    }
}
