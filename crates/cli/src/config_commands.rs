use {anyhow::Result, clap::Subcommand};

use skilldeck_config::validate::{self, Diagnostic, Severity};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the path of the config file in use.
    Path,
}

pub fn handle_config(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(*verbose),
        ConfigAction::Path => {
            match skilldeck_config::find_config_file() {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("No config file found; using defaults."),
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(verbose: bool) -> Result<()> {
    let result = validate::validate(None);

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }
        eprintln!("  {}", render(d));
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn render(d: &Diagnostic) -> String {
    let color = match d.severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    };
    if d.path.is_empty() {
        format!("{BOLD}{color}{}{RESET} {}", d.severity, d.message)
    } else {
        format!("{BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message)
    }
}
