//! Local skill registry: discovery, parsing, agent linkage, and uninstall.
//!
//! Skills are directories containing a `SKILL.md` file, installed once under
//! a shared canonical root and linked into each coding agent's own skill
//! directory by a same-named subdirectory.

pub mod error;
pub mod install;
pub mod parse;
pub mod paths;
pub mod refresh;
pub mod registry;
pub mod scan;
pub mod search;
pub mod types;
pub mod uninstall;
#[cfg(feature = "file-watcher")]
pub mod watcher;

pub use {
    error::{Error, Result},
    paths::SkillPaths,
    registry::LocalSkillRegistry,
    scan::{FsSkillScanner, SkillScanner},
    types::{AgentLocation, InstalledSkill, RegistrySnapshot},
    uninstall::{UninstallCoordinator, UninstallOutcome},
};
