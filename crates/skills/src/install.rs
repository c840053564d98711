//! Install commands handed to the external skill installer.
//!
//! Fetching and materializing skill content is entirely the installer's job;
//! this module only builds the command line for it.

use skilldeck_config::InstallerConfig;

use crate::search::CatalogEntry;

/// Program plus argv for one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallCommand {
    /// `npx -y skills add <source> --skill <id>` (program configurable).
    pub fn new(config: &InstallerConfig, source: &str, skill_id: &str) -> Self {
        Self {
            program: config.program.clone(),
            args: vec![
                "-y".into(),
                "skills".into(),
                "add".into(),
                source.into(),
                "--skill".into(),
                skill_id.into(),
            ],
        }
    }

    pub fn for_entry(config: &InstallerConfig, entry: &CatalogEntry) -> Self {
        Self::new(config, &entry.source, &entry.id)
    }

    /// Shell-quoted rendering for copy/paste.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '='));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_command() {
        let cmd = InstallCommand::new(&InstallerConfig::default(), "anthropics/skills", "pdf");
        assert_eq!(cmd.program, "npx");
        assert_eq!(
            cmd.display(),
            "npx -y skills add anthropics/skills --skill pdf"
        );
    }

    #[test]
    fn from_catalog_entry() {
        let entry = CatalogEntry {
            id: "frontend-design".into(),
            name: "Frontend Design".into(),
            installs: 3,
            source: "acme/skills".into(),
        };
        let cmd = InstallCommand::for_entry(&InstallerConfig::default(), &entry);
        assert_eq!(cmd.args[3], "acme/skills");
        assert_eq!(cmd.args[5], "frontend-design");
    }

    #[test]
    fn quotes_unsafe_arguments() {
        assert_eq!(shell_quote("plain-arg"), "plain-arg");
        assert_eq!(shell_quote("two words"), "'two words'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
