use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` against `home`.
///
/// Anything else (including `~user`) is returned unchanged.
pub fn expand_tilde(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_prefix() {
        let home = Path::new("/home/ada");
        assert_eq!(expand_tilde("~", home), PathBuf::from("/home/ada"));
        assert_eq!(
            expand_tilde("~/.agents/skills", home),
            PathBuf::from("/home/ada/.agents/skills")
        );
    }

    #[test]
    fn leaves_other_paths_alone() {
        let home = Path::new("/home/ada");
        assert_eq!(expand_tilde("/opt/skills", home), PathBuf::from("/opt/skills"));
        assert_eq!(expand_tilde("~bob/skills", home), PathBuf::from("~bob/skills"));
        assert_eq!(expand_tilde("rel/skills", home), PathBuf::from("rel/skills"));
    }
}
