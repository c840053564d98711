//! `skilldeck search`, `add`, and `open`: the remote catalog side.

use {
    anyhow::{Context as _, Result, bail},
    skilldeck_skills::{
        FsSkillScanner, LocalSkillRegistry,
        install::InstallCommand,
        search::{CatalogEntry, CatalogSearch, SkillsShClient},
    },
    tracing::{debug, info},
};

use crate::Context;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

pub async fn search(ctx: &Context, query: &str, limit: Option<u32>, json: bool) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config.catalog.limit);
    let client = SkillsShClient::from_config(&ctx.config.catalog)?;
    let results = client.search(query, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No skills found for '{}'.", query.trim());
        return Ok(());
    }

    let installed = LocalSkillRegistry::new(FsSkillScanner::new(ctx.paths.clone()))
        .assemble()
        .await;
    for entry in &results {
        let is_installed = installed.find(&entry.id).is_some();
        println!("{}", describe(ctx, entry, is_installed));
    }
    Ok(())
}

fn describe(ctx: &Context, entry: &CatalogEntry, installed: bool) -> String {
    let marker = if installed {
        format!(" {GREEN}(installed){RESET}")
    } else {
        String::new()
    };
    let command = InstallCommand::for_entry(&ctx.config.installer, entry);
    format!(
        "{BOLD}{}{RESET}{marker} {DIM}{} · {} installs{RESET}\n  {}",
        entry.name,
        entry.source,
        entry.installs,
        command.display()
    )
}

pub async fn add(ctx: &Context, source: &str, skill_id: &str, print: bool) -> Result<()> {
    let command = InstallCommand::new(&ctx.config.installer, source, skill_id);
    if print {
        println!("{}", command.display());
        return Ok(());
    }

    let program = which::which(&command.program).with_context(|| {
        format!(
            "'{}' not found on PATH; run the install manually:\n  {}",
            command.program,
            command.display()
        )
    })?;
    debug!(program = %program.display(), args = ?command.args, "running installer");

    let status = tokio::process::Command::new(&program)
        .args(&command.args)
        .status()
        .await
        .with_context(|| format!("failed to run {}", program.display()))?;
    if !status.success() {
        bail!("installer exited with {status}");
    }

    let snapshot = LocalSkillRegistry::new(FsSkillScanner::new(ctx.paths.clone()))
        .assemble()
        .await;
    match snapshot.find(skill_id) {
        Some(skill) => {
            info!(skill = %skill.directory_name, "skill installed");
            println!("Installed {}.", skill.canonical_name);
        },
        None => println!(
            "Installer finished, but {skill_id} is not in {}.",
            ctx.paths.canonical_root().display()
        ),
    }
    Ok(())
}

pub fn open_page(ctx: &Context, source: &str, skill_id: &str) -> Result<()> {
    let url = page_url(&ctx.config.catalog.base_url, source, skill_id);
    if let Err(e) = open::that(&url) {
        eprintln!("Could not open a browser ({e}). Visit {url}");
    }
    Ok(())
}

fn page_url(base_url: &str, source: &str, skill_id: &str) -> String {
    CatalogEntry {
        id: skill_id.to_string(),
        name: skill_id.to_string(),
        installs: 0,
        source: source.to_string(),
    }
    .page_url(base_url)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        skilldeck_config::SkilldeckConfig,
        skilldeck_skills::{AgentLocation, SkillPaths},
    };

    fn context() -> Context {
        Context {
            config: SkilldeckConfig::default(),
            paths: SkillPaths::new("/nonexistent/skills", vec![AgentLocation::new(
                "Cursor",
                "/nonexistent/cursor",
            )]),
        }
    }

    #[test]
    fn page_url_uses_base() {
        assert_eq!(
            page_url("https://skills.sh", "anthropics/skills", "pdf"),
            "https://skills.sh/anthropics/skills/pdf"
        );
    }

    #[test]
    fn describe_lists_install_command() {
        let entry = CatalogEntry {
            id: "pdf".into(),
            name: "pdf".into(),
            installs: 1200,
            source: "anthropics/skills".into(),
        };
        let text = describe(&context(), &entry, true);
        assert!(text.contains("(installed)"));
        assert!(text.contains("1200 installs"));
        assert!(text.contains("npx -y skills add anthropics/skills --skill pdf"));
    }

    #[tokio::test]
    async fn add_with_print_does_not_run_installer() {
        let mut ctx = context();
        ctx.config.installer.program = "definitely-not-an-installer".into();
        add(&ctx, "acme/skills", "demo", true).await.unwrap();
    }

    #[tokio::test]
    async fn add_reports_missing_installer() {
        let mut ctx = context();
        ctx.config.installer.program = "definitely-not-an-installer".into();
        let err = add(&ctx, "acme/skills", "demo", false).await.unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }
}
