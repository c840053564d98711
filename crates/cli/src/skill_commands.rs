//! `skilldeck list`, `info`, `uninstall`, and `watch`.

use std::{
    io::Write,
    sync::Arc,
};

use {
    anyhow::{Result, bail},
    skilldeck_skills::{
        FsSkillScanner, InstalledSkill, LocalSkillRegistry, RegistrySnapshot, UninstallCoordinator,
        refresh::RegistryRefresher,
        uninstall::{LocationOutcome, Removal},
    },
};

use crate::Context;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn registry(ctx: &Context) -> LocalSkillRegistry<FsSkillScanner> {
    LocalSkillRegistry::new(FsSkillScanner::new(ctx.paths.clone()))
}

fn new_refresher(ctx: &Context) -> RegistryRefresher<FsSkillScanner> {
    RegistryRefresher::new(Arc::new(registry(ctx)))
}

/// Rescan now. Falls back to the last published snapshot if another refresh
/// overtook this one.
async fn rescan(refresher: &RegistryRefresher<FsSkillScanner>) -> Arc<RegistrySnapshot> {
    match refresher.refresh().await {
        Some(snapshot) => snapshot,
        None => refresher.latest(),
    }
}

pub async fn list(ctx: &Context, json: bool) -> Result<()> {
    let snapshot = registry(ctx).assemble().await;
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot.skills())?);
    } else {
        print_listing(ctx, &snapshot);
    }
    Ok(())
}

fn print_listing(ctx: &Context, snapshot: &RegistrySnapshot) {
    if snapshot.is_empty() {
        println!(
            "No skills installed in {}.",
            ctx.paths.canonical_root().display()
        );
        return;
    }
    for skill in snapshot.skills() {
        println!("{}", describe(skill));
    }
}

fn describe(skill: &InstalledSkill) -> String {
    let mut out = format!("{BOLD}{}{RESET}", skill.canonical_name);
    if skill.canonical_name != skill.directory_name {
        out.push_str(&format!(" {DIM}({}){RESET}", skill.directory_name));
    }
    if !skill.description.is_empty() {
        out.push_str(&format!("\n  {}", skill.description));
    }
    let linked = if skill.linked_agents.is_empty() {
        "no agents".to_string()
    } else {
        skill.linked_agents.join(", ")
    };
    out.push_str(&format!(
        "\n  {DIM}installed {} · linked to {linked}{RESET}",
        format_timestamp(skill.first_seen_at_ms)
    ));
    out
}

fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "at an unknown time".into())
}

pub async fn info(ctx: &Context, name: &str) -> Result<()> {
    let doc = registry(ctx).load_skill(name).await?;
    let skill = &doc.skill;
    println!("Name:        {}", skill.canonical_name);
    println!("Directory:   {}", skill.directory_name);
    if !skill.description.is_empty() {
        println!("Description: {}", skill.description);
    }
    println!("Path:        {}", skill.canonical_path.display());
    println!("Installed:   {}", format_timestamp(skill.first_seen_at_ms));
    if skill.linked_agents.is_empty() {
        println!("Agents:      none");
    } else {
        println!("Agents:      {}", skill.linked_agents.join(", "));
    }
    if !doc.body.is_empty() {
        println!("\n{}", doc.body);
    }
    Ok(())
}

pub async fn uninstall(ctx: &Context, name: &str, yes: bool) -> Result<()> {
    let refresher = new_refresher(ctx);
    let snapshot = rescan(&refresher).await;
    let Some(skill) = snapshot.find(name).cloned() else {
        bail!("no installed skill named '{name}'");
    };

    if !yes {
        eprintln!(
            "This removes {} from {} and from every agent skill directory.",
            skill.canonical_name,
            ctx.paths.canonical_root().display()
        );
        if !skill.linked_agents.is_empty() {
            eprintln!("Linked agents: {}", skill.linked_agents.join(", "));
        }
        if !prompt_yes_no(&format!("Uninstall {}?", skill.directory_name), false)? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let outcome = UninstallCoordinator::new(ctx.paths.clone())
        .uninstall(&skill)
        .await;
    for location in &outcome.locations {
        eprintln!("  {}", render_location(location));
    }
    println!("{outcome}");

    let after = rescan(&refresher).await;
    if after.find(name).is_some() {
        eprintln!("{name} is still installed.");
    } else {
        eprintln!("{name} is no longer installed.");
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_location(location: &LocationOutcome) -> String {
    let path = location.path.display();
    match &location.result {
        Ok(Removal::Removed) => format!("[{GREEN}ok{RESET}]    {}: removed {path}", location.target),
        Ok(Removal::AlreadyAbsent) => {
            format!("[{DIM}skip{RESET}]  {}: not present", location.target)
        },
        Err(e) => format!("[{RED}fail{RESET}]  {}: {path}: {e}", location.target),
    }
}

fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes {
        "Y/n"
    } else {
        "y/N"
    };
    loop {
        let mut stderr = std::io::stderr();
        write!(stderr, "{prompt} [{hint}]: ")?;
        stderr.flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            return Ok(default_yes);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(default_yes),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => eprintln!("Please answer with 'y' or 'n'."),
        }
    }
}

#[cfg(feature = "file-watcher")]
pub async fn watch(ctx: &Context) -> Result<()> {
    use skilldeck_skills::watcher::SkillWatcher;

    let refresher = Arc::new(new_refresher(ctx));
    let (mut watcher, mut events) = SkillWatcher::for_paths(&ctx.paths)?;
    if watcher.watched().is_empty() && watcher.pending_ancestor().is_none() {
        bail!(
            "nothing to watch: {} does not exist and no agent skill directory was found",
            ctx.paths.canonical_root().display()
        );
    }
    eprintln!(
        "Watching {} skill directories. Press Ctrl-C to stop.",
        watcher.watched().len()
    );
    if let Some(parent) = watcher.pending_ancestor() {
        eprintln!(
            "{} does not exist yet; waiting for it under {}.",
            ctx.paths.canonical_root().display(),
            parent.display()
        );
    }

    let mut snapshots = refresher.subscribe();
    spawn_refresh(&refresher);

    loop {
        tokio::select! {
            event = events.recv() => {
                if event.is_none() {
                    break;
                }
                match watcher.rearm() {
                    Ok(true) => eprintln!(
                        "Now watching {}.",
                        ctx.paths.canonical_root().display()
                    ),
                    Ok(false) => {},
                    Err(e) => tracing::warn!(error = %e, "skill watcher: could not follow skill directory"),
                }
                spawn_refresh(&refresher);
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!();
                print_listing(ctx, &snapshot);
            },
            _ = tokio::signal::ctrl_c() => {
                refresher.cancel();
                break;
            },
        }
    }

    drop(watcher);
    Ok(())
}

/// Each refresh supersedes the one before it, so bursts of events collapse
/// into the last scan.
#[cfg(feature = "file-watcher")]
fn spawn_refresh(refresher: &Arc<RegistryRefresher<FsSkillScanner>>) {
    let refresher = Arc::clone(refresher);
    tokio::spawn(async move {
        refresher.refresh().await;
    });
}
