//! `skilldeck doctor`: skill directory health, agent coverage, installer and
//! config checks.
//!
//! Prints a structured report with `[ok]`, `[warn]`, `[fail]`, or `[info]`
//! status indicators per item.

use std::path::Path;

use {
    anyhow::Result,
    skilldeck_config::{
        InstallerConfig,
        validate::{self, Severity},
    },
    skilldeck_skills::{FsSkillScanner, LocalSkillRegistry, RegistrySnapshot, SkillPaths},
};

use crate::Context;

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

pub async fn handle_doctor(ctx: &Context) -> Result<()> {
    eprintln!("{BOLD}skilldeck doctor{RESET}");
    eprintln!("{BOLD}================{RESET}\n");

    let snapshot = LocalSkillRegistry::new(FsSkillScanner::new(ctx.paths.clone()))
        .assemble()
        .await;

    let sections = vec![
        check_config(),
        check_canonical_root(ctx.paths.canonical_root(), &snapshot),
        check_agents(&ctx.paths, &snapshot),
        check_installer(&ctx.config.installer),
    ];

    let (errors, warnings) = print_report(&sections);
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── Config ──────────────────────────────────────────────────────────────────

fn check_config() -> Section {
    let result = validate::validate(None);
    let label = result
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".into());
    let mut section = Section::new(format!("Config ({label})"));

    let mut clean = true;
    for d in &result.diagnostics {
        let status = match d.severity {
            Severity::Error => Status::Fail,
            Severity::Warning => Status::Warn,
            Severity::Info => Status::Info,
        };
        if status != Status::Info {
            clean = false;
        }
        let msg = if d.path.is_empty() {
            d.message.clone()
        } else {
            format!("{}: {}", d.path, d.message)
        };
        section.push(status, msg);
    }
    if clean {
        section.push(Status::Ok, "No config issues");
    }
    section
}

// ── Skill directories ───────────────────────────────────────────────────────

fn check_canonical_root(root: &Path, snapshot: &RegistrySnapshot) -> Section {
    let mut section = Section::new("Shared skills directory");
    if root.is_dir() {
        section.push(Status::Ok, format!("{} exists", root.display()));
        section.push(
            Status::Info,
            format!("{} skill(s) installed", snapshot.len()),
        );
    } else if root.exists() {
        section.push(
            Status::Fail,
            format!("{} exists but is not a directory", root.display()),
        );
    } else {
        section.push(
            Status::Info,
            format!("{} does not exist yet (no skills installed)", root.display()),
        );
    }
    section
}

fn check_agents(paths: &SkillPaths, snapshot: &RegistrySnapshot) -> Section {
    let mut section = Section::new("Agents");
    for agent in paths.agents() {
        let linked = snapshot
            .skills()
            .iter()
            .filter(|s| s.is_linked_to(&agent.display_name))
            .count();
        if agent.root.is_dir() {
            section.push(
                Status::Ok,
                format!(
                    "{}: {} ({linked}/{} skills linked)",
                    agent.display_name,
                    agent.root.display(),
                    snapshot.len()
                ),
            );
        } else if agent.root.exists() {
            section.push(
                Status::Warn,
                format!(
                    "{}: {} is not a directory",
                    agent.display_name,
                    agent.root.display()
                ),
            );
        } else {
            section.push(
                Status::Info,
                format!("{}: no skill directory", agent.display_name),
            );
        }
    }
    section
}

// ── Installer ───────────────────────────────────────────────────────────────

fn check_installer(config: &InstallerConfig) -> Section {
    let mut section = Section::new("Installer");
    match which::which(&config.program) {
        Ok(path) => section.push(Status::Ok, format!("{} found at {}", config.program, path.display())),
        Err(_) => section.push(
            Status::Warn,
            format!(
                "{} not found on PATH; `skilldeck add` will only print install commands",
                config.program
            ),
        ),
    }
    section
}
