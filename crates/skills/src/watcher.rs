//! Filesystem watcher for the canonical and agent skill directories.
//!
//! Sends a notification whenever a skill directory appears or disappears or a
//! `SKILL.md` changes, so callers can trigger a registry refresh.
//!
//! A canonical root that does not exist yet is followed through its nearest
//! existing ancestor until it is created; call [`SkillWatcher::rearm`] after
//! each event to move the watch down.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use {
    notify_debouncer_full::{
        DebounceEventResult, Debouncer, RecommendedCache, new_debouncer,
        notify::{EventKind, RecommendedWatcher, RecursiveMode},
    },
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::{error::Result, parse::SKILL_FILE, paths::SkillPaths};

/// Events emitted by the skill watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillWatchEvent {
    Changed,
}

/// Watches skill directories with debouncing. Dropping it stops the watch.
pub struct SkillWatcher {
    debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    watched: Vec<PathBuf>,
    pending: Option<PendingRoot>,
}

/// A directory still to be created, and the ancestor watched in its place.
struct PendingRoot {
    root: PathBuf,
    ancestor: Option<PathBuf>,
}

impl SkillWatcher {
    /// Watch the canonical root and every agent root that currently exists.
    pub fn for_paths(
        paths: &SkillPaths,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SkillWatchEvent>)> {
        let dirs = std::iter::once(paths.canonical_root().to_path_buf())
            .chain(paths.agents().iter().map(|a| a.root.clone()))
            .collect();
        let (mut watcher, rx) = Self::start(dirs)?;
        if !paths.canonical_root().is_dir() {
            watcher.follow(paths.canonical_root().to_path_buf())?;
        }
        Ok((watcher, rx))
    }

    /// Start watching `dirs`; missing directories are skipped.
    pub fn start(dirs: Vec<PathBuf>) -> Result<(Self, mpsc::UnboundedReceiver<SkillWatchEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(
            Duration::from_millis(500),
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let changed = events
                        .iter()
                        .any(|event| event.paths.iter().any(|p| is_relevant(&event.kind, p)));
                    if changed {
                        let _ = tx.send(SkillWatchEvent::Changed);
                    }
                },
                Err(errors) => {
                    for e in errors {
                        warn!(error = %e, "skill watcher error");
                    }
                },
            },
        )?;

        let mut watched = Vec::new();
        for dir in dirs {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "skill watcher: directory missing, not watching");
                continue;
            }
            debouncer.watch(&dir, RecursiveMode::Recursive)?;
            info!(dir = %dir.display(), "skill watcher: watching directory");
            watched.push(dir);
        }

        Ok((
            Self {
                debouncer,
                watched,
                pending: None,
            },
            rx,
        ))
    }

    /// Directories watched recursively.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Ancestor standing in for a directory that does not exist yet.
    pub fn pending_ancestor(&self) -> Option<&Path> {
        self.pending.as_ref().and_then(|p| p.ancestor.as_deref())
    }

    /// Wait for `root` to appear by watching its nearest existing ancestor.
    pub fn follow(&mut self, root: PathBuf) -> Result<()> {
        info!(dir = %root.display(), "skill watcher: directory missing, following nearest parent");
        self.pending = Some(PendingRoot {
            root,
            ancestor: None,
        });
        self.rearm().map(|_| ())
    }

    /// Move the pending watch closer to its target. Returns `true` once the
    /// followed directory exists and is watched itself.
    pub fn rearm(&mut self) -> Result<bool> {
        let Some(mut pending) = self.pending.take() else {
            return Ok(false);
        };

        if pending.root.is_dir() {
            if let Some(ancestor) = pending.ancestor.take() {
                self.unwatch_quietly(&ancestor);
            }
            self.debouncer.watch(&pending.root, RecursiveMode::Recursive)?;
            info!(dir = %pending.root.display(), "skill watcher: watching directory");
            self.watched.push(pending.root);
            return Ok(true);
        }

        let nearest = nearest_existing_ancestor(&pending.root);
        if nearest != pending.ancestor {
            if let Some(old) = pending.ancestor.take() {
                self.unwatch_quietly(&old);
            }
            if let Some(dir) = &nearest {
                self.debouncer.watch(dir, RecursiveMode::NonRecursive)?;
                debug!(dir = %dir.display(), "skill watcher: watching parent of missing directory");
            }
            pending.ancestor = nearest;
        }
        self.pending = Some(pending);
        Ok(false)
    }

    fn unwatch_quietly(&mut self, dir: &Path) {
        if let Err(e) = self.debouncer.unwatch(dir) {
            debug!(dir = %dir.display(), error = %e, "skill watcher: unwatch failed");
        }
    }
}

fn nearest_existing_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|dir| dir.is_dir())
        .map(Path::to_path_buf)
}

fn is_relevant(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(_) => path.file_name().is_some_and(|n| n == SKILL_FILE),
        _ => false,
    }
}
