//! Latest-wins registry refreshes.
//!
//! Starting a refresh cancels the one in flight, and a scan that was
//! superseded never publishes its snapshot, so subscribers only ever see the
//! most recently requested state.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use {
    tokio::sync::watch,
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::{registry::LocalSkillRegistry, scan::SkillScanner, types::RegistrySnapshot};

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

pub struct RegistryRefresher<S> {
    registry: Arc<LocalSkillRegistry<S>>,
    generation: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
    tx: watch::Sender<Arc<RegistrySnapshot>>,
}

impl<S: SkillScanner> RegistryRefresher<S> {
    pub fn new(registry: Arc<LocalSkillRegistry<S>>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(RegistrySnapshot::default()));
        Self {
            registry,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            tx,
        }
    }

    pub fn registry(&self) -> &LocalSkillRegistry<S> {
        &self.registry
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RegistrySnapshot>> {
        self.tx.subscribe()
    }

    /// The last published snapshot (empty before the first refresh).
    pub fn latest(&self) -> Arc<RegistrySnapshot> {
        self.tx.borrow().clone()
    }

    /// Rescan, superseding any refresh still running.
    ///
    /// Returns `None` when this scan was itself superseded before finishing.
    pub async fn refresh(&self) -> Option<Arc<RegistrySnapshot>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        self.swap_in_flight(Some(InFlight {
            generation,
            cancel: cancel.clone(),
        }));

        let snapshot = Arc::new(self.registry.assemble_with(&cancel).await);

        if !self.finish(generation) {
            debug!(generation, "discarding superseded registry scan");
            return None;
        }

        self.tx.send_replace(snapshot.clone());
        Some(snapshot)
    }

    /// Abandon the scan in flight, if any. Its result is discarded.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.swap_in_flight(None);
    }

    fn swap_in_flight(&self, next: Option<InFlight>) {
        match self.in_flight.lock() {
            Ok(mut guard) => {
                if let Some(previous) = std::mem::replace(&mut *guard, next) {
                    previous.cancel.cancel();
                }
            },
            Err(e) => warn!(error = %e, "registry refresh state poisoned"),
        }
    }

    /// Clear the in-flight slot if `generation` still owns it. Returns whether
    /// the scan is still the latest one requested.
    fn finish(&self, generation: u64) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        if let Ok(mut guard) = self.in_flight.lock()
            && guard.as_ref().is_some_and(|f| f.generation == generation)
        {
            *guard = None;
        }
        true
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            parse::SKILL_FILE,
            paths::SkillPaths,
            scan::FsSkillScanner,
            types::ScannedSkill,
        },
        async_trait::async_trait,
        tokio::sync::Notify,
    };

    fn fs_refresher(root: &std::path::Path) -> RegistryRefresher<FsSkillScanner> {
        let scanner = FsSkillScanner::new(SkillPaths::new(root, Vec::new()));
        RegistryRefresher::new(Arc::new(LocalSkillRegistry::new(scanner)))
    }

    #[tokio::test]
    async fn refresh_publishes_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("demo")).unwrap();
        std::fs::write(tmp.path().join("demo").join(SKILL_FILE), "demo").unwrap();

        let refresher = fs_refresher(tmp.path());
        let mut rx = refresher.subscribe();
        assert!(refresher.latest().is_empty());

        let snapshot = refresher.refresh().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert_eq!(refresher.latest().len(), 1);
    }

    #[tokio::test]
    async fn refresh_reflects_removal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("demo")).unwrap();
        std::fs::write(tmp.path().join("demo").join(SKILL_FILE), "demo").unwrap();

        let refresher = fs_refresher(tmp.path());
        assert_eq!(refresher.refresh().await.unwrap().len(), 1);
        std::fs::remove_dir_all(tmp.path().join("demo")).unwrap();
        assert!(refresher.refresh().await.unwrap().is_empty());
    }

    /// Blocks inside `scan` until released, then honours cancellation.
    struct GatedScanner {
        paths: SkillPaths,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl SkillScanner for GatedScanner {
        async fn scan(&self, cancel: &CancellationToken) -> Vec<ScannedSkill> {
            self.entered.notify_one();
            self.release.notified().await;
            if cancel.is_cancelled() {
                return Vec::new();
            }
            vec![ScannedSkill {
                directory_name: "late".into(),
                path: self.paths.canonical_path_for("late"),
                descriptor: crate::parse::parse(""),
                first_seen_at_ms: 1,
                linked_agents: Vec::new(),
            }]
        }

        fn paths(&self) -> &SkillPaths {
            &self.paths
        }
    }

    #[tokio::test]
    async fn superseded_scan_is_discarded() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let refresher = Arc::new(RegistryRefresher::new(Arc::new(LocalSkillRegistry::new(
            GatedScanner {
                paths: SkillPaths::new("/canon", Vec::new()),
                entered: entered.clone(),
                release: release.clone(),
            },
        ))));

        let first = tokio::spawn({
            let refresher = refresher.clone();
            async move { refresher.refresh().await }
        });
        entered.notified().await;

        // Cancelling supersedes the in-flight scan.
        refresher.cancel();
        release.notify_one();

        assert!(first.await.unwrap().is_none());
        assert!(refresher.latest().is_empty());
    }
}
