//! Configuration validation.
//!
//! Checks a config file against the known schema, flags unknown or
//! misspelled fields, and reports values that would break scanning or search.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use skilldeck_common::paths::expand_tilde;

use crate::{env_subst::substitute_env, schema::SkilldeckConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "value", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "catalog.limit"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "skills",
            Struct(HashMap::from([("canonical_root", Leaf), ("home_dir", Leaf)])),
        ),
        (
            "catalog",
            Struct(HashMap::from([
                ("base_url", Leaf),
                ("limit", Leaf),
                ("timeout_secs", Leaf),
            ])),
        ),
        ("installer", Struct(HashMap::from([("program", Leaf)]))),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or the discovered config file
/// if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no config file found; using defaults".into(),
            }],
            config_path: None,
        };
    };

    let content = match std::fs::read_to_string(&actual_path) {
        Ok(content) => substitute_env(&content),
        Err(e) => {
            return ValidationResult {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    category: "syntax",
                    path: String::new(),
                    message: format!("failed to read config file: {e}"),
                }],
                config_path: Some(actual_path),
            };
        },
    };

    let ext = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml");
    let value = match parse_value(&content, ext) {
        Ok(value) => value,
        Err(message) => {
            return ValidationResult {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    category: "syntax",
                    path: String::new(),
                    message,
                }],
                config_path: Some(actual_path),
            };
        },
    };

    let mut result = validate_value(&value);
    result.config_path = Some(actual_path);
    result
}

/// Validate a TOML string without touching the filesystem.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    match parse_value(toml_str, "toml") {
        Ok(value) => validate_value(&value),
        Err(message) => ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message,
            }],
            config_path: None,
        },
    }
}

fn parse_value(raw: &str, ext: &str) -> Result<serde_json::Value, String> {
    match ext {
        "toml" => toml::from_str::<toml::Value>(raw)
            .map_err(|e| format!("TOML syntax error: {e}"))
            .and_then(|v| serde_json::to_value(v).map_err(|e| e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str::<serde_json::Value>(raw)
            .map_err(|e| format!("YAML syntax error: {e}")),
        "json" => serde_json::from_str(raw).map_err(|e| format!("JSON syntax error: {e}")),
        other => Err(format!("unsupported config format: .{other}")),
    }
}

fn validate_value(value: &serde_json::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    check_unknown_fields(value, &build_schema_map(), "", &mut diagnostics);

    match serde_json::from_value::<SkilldeckConfig>(value.clone()) {
        Ok(config) => check_values(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &serde_json::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (serde_json::Value::Object(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };
    let known_keys: Vec<&str> = fields.keys().copied().collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child_value, child_schema, &path, diagnostics);
            continue;
        }
        let message = match suggest(key, &known_keys, 3) {
            Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
            None => "unknown field".to_string(),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "unknown-field",
            path,
            message,
        });
    }
}

fn check_values(config: &SkilldeckConfig, diagnostics: &mut Vec<Diagnostic>) {
    if let Err(e) = url::Url::parse(&config.catalog.base_url) {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "catalog.base_url".into(),
            message: format!("invalid URL: {e}"),
        });
    }

    if !(1..=100).contains(&config.catalog.limit) {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "catalog.limit".into(),
            message: format!("must be between 1 and 100, got {}", config.catalog.limit),
        });
    }

    if config.catalog.timeout_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "catalog.timeout_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.installer.program.trim().is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "installer.program".into(),
            message: "must not be empty".into(),
        });
    }

    for (path, raw) in [
        ("skills.canonical_root", &config.skills.canonical_root),
        ("skills.home_dir", &config.skills.home_dir),
    ] {
        let Some(raw) = raw else {
            continue;
        };
        if raw.trim().is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "value",
                path: path.into(),
                message: "must not be empty".into(),
            });
        } else if !expand_tilde(raw, Path::new("/")).is_absolute() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "value",
                path: path.into(),
                message: "relative path is resolved against the working directory".into(),
            });
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(result: &'a ValidationResult, path: &str) -> Option<&'a Diagnostic> {
        result.diagnostics.iter().find(|d| d.path == path)
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("catalog", "catalog"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("catalog", "catalg"), 1);
        assert_eq!(levenshtein("limit", "limt"), 1);
    }

    #[test]
    fn defaults_are_clean() {
        let result = validate_toml_str("");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn unknown_top_level_key_with_suggestion() {
        let result = validate_toml_str("[catalg]\nlimit = 3\n");
        let d = find(&result, "catalg").unwrap();
        assert_eq!(d.category, "unknown-field");
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.message.contains("catalog"));
    }

    #[test]
    fn unknown_nested_key() {
        let result = validate_toml_str("[skills]\ncanonical_rot = \"/x\"\n");
        let d = find(&result, "skills.canonical_rot").unwrap();
        assert!(d.message.contains("canonical_root"));
    }

    #[test]
    fn syntax_error_reported() {
        let result = validate_toml_str("[catalog\n");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn type_error_reported() {
        let result = validate_toml_str("[catalog]\nlimit = \"many\"\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "type-error")
        );
    }

    #[test]
    fn bad_values_reported() {
        let result = validate_toml_str(
            "[catalog]\nbase_url = \"not a url\"\nlimit = 0\ntimeout_secs = 0\n\n[installer]\nprogram = \"  \"\n",
        );
        assert_eq!(result.count(Severity::Error), 4);
        assert!(find(&result, "catalog.base_url").is_some());
        assert!(find(&result, "catalog.limit").is_some());
        assert!(find(&result, "catalog.timeout_secs").is_some());
        assert!(find(&result, "installer.program").is_some());
    }

    #[test]
    fn relative_canonical_root_warns() {
        let result = validate_toml_str("[skills]\ncanonical_root = \"skills\"\n");
        let d = find(&result, "skills.canonical_root").unwrap();
        assert_eq!(d.severity, Severity::Warning);

        let result = validate_toml_str("[skills]\ncanonical_root = \"~/.agents/skills\"\n");
        assert!(find(&result, "skills.canonical_root").is_none());
    }

    #[test]
    fn validate_reads_yaml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skilldeck.yaml");
        std::fs::write(&path, "catalog:\n  limit: 500\n").unwrap();
        let result = validate(Some(&path));
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
        assert!(find(&result, "catalog.limit").is_some());
    }
}
