mod catalog_commands;
mod config_commands;
mod doctor_commands;
mod skill_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    skilldeck_config::SkilldeckConfig,
    skilldeck_skills::SkillPaths,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "skilldeck",
    version,
    about = "Skilldeck: manage skills shared between coding agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom config directory (overrides default ~/.config/skilldeck/).
    #[arg(long, global = true, env = "SKILLDECK_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Resolve skill locations against this home directory.
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Shared skill directory (overrides ~/.agents/skills).
    #[arg(long, global = true)]
    canonical_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed skills, most recently installed first.
    List {
        /// Print the registry as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one installed skill and its instructions.
    Info {
        /// Skill directory name.
        name: String,
    },
    /// Remove a skill from the shared directory and every agent.
    Uninstall {
        /// Skill directory name.
        name: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Search the remote skill catalog.
    Search {
        query: String,
        /// Maximum number of results (defaults to `catalog.limit`).
        #[arg(long)]
        limit: Option<u32>,
        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Install a skill through the external installer.
    Add {
        /// Source repository, usually owner/repo.
        source: String,
        /// Skill identifier within the source.
        skill_id: String,
        /// Print the install command instead of running it.
        #[arg(long)]
        print: bool,
    },
    /// Open a skill's catalog page in the browser.
    Open { source: String, skill_id: String },
    /// Watch skill directories and print the registry whenever it changes.
    #[cfg(feature = "file-watcher")]
    Watch,
    /// Check skill directories and configuration.
    Doctor,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Loaded config plus the skill locations derived from it and the CLI flags.
pub(crate) struct Context {
    pub config: SkilldeckConfig,
    pub paths: SkillPaths,
}

impl Context {
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = skilldeck_config::discover_and_load();
        apply_overrides(&mut config, cli);
        let paths = SkillPaths::from_config(&config.skills)?;
        debug!(
            canonical_root = %paths.canonical_root().display(),
            agents = paths.agents().len(),
            "resolved skill locations"
        );
        Ok(Self { config, paths })
    }
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut SkilldeckConfig, cli: &Cli) {
    if let Some(ref home) = cli.home {
        config.skills.home_dir = Some(home.to_string_lossy().into_owned());
    }
    if let Some(ref root) = cli.canonical_root {
        config.skills.canonical_root = Some(root.to_string_lossy().into_owned());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "skilldeck starting");

    if let Some(ref dir) = cli.config_dir {
        skilldeck_config::set_config_dir(dir.clone());
    }

    if let Commands::Config { ref action } = cli.command {
        return config_commands::handle_config(action);
    }

    let ctx = Context::load(&cli)?;
    match &cli.command {
        Commands::List { json } => skill_commands::list(&ctx, *json).await,
        Commands::Info { name } => skill_commands::info(&ctx, name).await,
        Commands::Uninstall { name, yes } => skill_commands::uninstall(&ctx, name, *yes).await,
        Commands::Search { query, limit, json } => {
            catalog_commands::search(&ctx, query, *limit, *json).await
        },
        Commands::Add {
            source,
            skill_id,
            print,
        } => catalog_commands::add(&ctx, source, skill_id, *print).await,
        Commands::Open { source, skill_id } => catalog_commands::open_page(&ctx, source, skill_id),
        #[cfg(feature = "file-watcher")]
        Commands::Watch => skill_commands::watch(&ctx).await,
        Commands::Doctor => doctor_commands::handle_doctor(&ctx).await,
        Commands::Config { .. } => Ok(()),
    }
}
