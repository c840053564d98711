//! `SKILL.md` parsing.
//!
//! A skill document may open with a metadata block fenced by `---` lines.
//! Only single-line `name:` and `description:` declarations are read from
//! it; everything else in the block is ignored. Parsing never fails: a
//! missing or malformed block simply yields absent fields.

/// Well-known metadata document inside every skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

const MARKER: &str = "---";

/// Fields declared in a metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterFields {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Whether the document carried a metadata block at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frontmatter {
    Present(FrontmatterFields),
    Absent,
}

/// Parsed skill document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDescriptor {
    pub frontmatter: Frontmatter,
    /// Document content after the metadata block, trimmed. The whole input
    /// when there is no block.
    pub body: String,
}

impl SkillDescriptor {
    pub fn declared_name(&self) -> Option<&str> {
        match &self.frontmatter {
            Frontmatter::Present(fields) => fields.name.as_deref(),
            Frontmatter::Absent => None,
        }
    }

    pub fn declared_description(&self) -> Option<&str> {
        match &self.frontmatter {
            Frontmatter::Present(fields) => fields.description.as_deref(),
            Frontmatter::Absent => None,
        }
    }
}

/// Parse a `SKILL.md` document.
pub fn parse(document: &str) -> SkillDescriptor {
    match split_frontmatter(document) {
        Some((block, body)) => SkillDescriptor {
            frontmatter: Frontmatter::Present(parse_fields(block)),
            body: body.trim().to_string(),
        },
        None => SkillDescriptor {
            frontmatter: Frontmatter::Absent,
            body: document.to_string(),
        },
    }
}

/// Split at the opening and closing marker lines into (block, body).
///
/// Returns `None` when the first line is not a marker or the block is never
/// closed.
fn split_frontmatter(document: &str) -> Option<(&str, &str)> {
    let content = document.strip_prefix('\u{feff}').unwrap_or(document);
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    if !is_marker(first) {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_marker(line) {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn is_marker(line: &str) -> bool {
    line.trim_end() == MARKER
}

fn parse_fields(block: &str) -> FrontmatterFields {
    let mut name = None;
    let mut description = None;

    for line in block.lines() {
        if name.is_none()
            && let Some(raw) = line.strip_prefix("name:")
        {
            name = Some(scalar_value(raw));
        } else if description.is_none()
            && let Some(raw) = line.strip_prefix("description:")
        {
            description = Some(scalar_value(raw));
        }
    }

    FrontmatterFields {
        name: name.flatten(),
        description: description.flatten(),
    }
}

/// Read a single-line value. Block scalars, flow collections, and empty
/// values come back as `None`.
fn scalar_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value.starts_with(['|', '>', '[', '{']) {
        return None;
    }

    let unquoted = ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value)
        .trim();

    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_description_and_body() {
        let doc = "---\nname: PDF Forms\ndescription: Fill PDF forms\n---\nUsage...";
        let parsed = parse(doc);
        assert_eq!(parsed.declared_name(), Some("PDF Forms"));
        assert_eq!(parsed.declared_description(), Some("Fill PDF forms"));
        assert_eq!(parsed.body, "Usage...");
    }

    #[test]
    fn document_without_block_is_all_body() {
        let doc = "# My Skill\nDo things.";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter, Frontmatter::Absent);
        assert_eq!(parsed.declared_name(), None);
        assert_eq!(parsed.declared_description(), None);
        assert_eq!(parsed.body, doc);
    }

    #[test]
    fn unclosed_block_is_treated_as_absent() {
        let doc = "---\nname: test\nno closing\n";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter, Frontmatter::Absent);
        assert_eq!(parsed.body, doc);
    }

    #[test]
    fn leading_blank_line_means_no_block() {
        let doc = "\n---\nname: late\n---\nbody";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter, Frontmatter::Absent);
        assert_eq!(parsed.body, doc);
    }

    #[test]
    fn body_is_trimmed() {
        let parsed = parse("---\nname: x\n---\n\n\n  Body text.  \n\n");
        assert_eq!(parsed.body, "Body text.");
    }

    #[test]
    fn crlf_line_endings() {
        let parsed = parse("---\r\nname: windows\r\ndescription: crlf\r\n---\r\nbody\r\n");
        assert_eq!(parsed.declared_name(), Some("windows"));
        assert_eq!(parsed.declared_description(), Some("crlf"));
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn first_occurrence_wins() {
        let parsed = parse("---\nname: first\nname: second\n---\n");
        assert_eq!(parsed.declared_name(), Some("first"));
    }

    #[test]
    fn block_without_keys_is_present_but_empty() {
        let parsed = parse("---\nlicense: MIT\n---\nbody");
        assert_eq!(
            parsed.frontmatter,
            Frontmatter::Present(FrontmatterFields::default())
        );
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn nested_keys_are_not_picked_up() {
        let parsed = parse("---\nmetadata:\n  name: nested\ndescription: top\n---\n");
        assert_eq!(parsed.declared_name(), None);
        assert_eq!(parsed.declared_description(), Some("top"));
    }

    #[test]
    fn unsupported_shapes_degrade_to_absent() {
        let parsed = parse("---\nname: [a, b]\ndescription: >\n  folded\n  text\n---\n");
        assert_eq!(parsed.declared_name(), None);
        assert_eq!(parsed.declared_description(), None);
    }

    #[test]
    fn empty_value_is_absent() {
        let parsed = parse("---\nname:\ndescription:    \n---\n");
        assert_eq!(parsed.declared_name(), None);
        assert_eq!(parsed.declared_description(), None);
    }

    #[test]
    fn quoted_values_are_unwrapped() {
        let parsed = parse("---\nname: \"pdf: forms\"\ndescription: 'Fill it'\n---\n");
        assert_eq!(parsed.declared_name(), Some("pdf: forms"));
        assert_eq!(parsed.declared_description(), Some("Fill it"));
    }

    #[test]
    fn lone_quote_is_kept() {
        let parsed = parse("---\nname: \"\n---\n");
        assert_eq!(parsed.declared_name(), Some("\""));
    }

    #[test]
    fn marker_must_be_exact() {
        let parsed = parse("----\nname: x\n----\nbody");
        assert_eq!(parsed.frontmatter, Frontmatter::Absent);
    }

    #[test]
    fn closing_marker_at_end_of_file() {
        let parsed = parse("---\nname: tail\n---");
        assert_eq!(parsed.declared_name(), Some("tail"));
        assert_eq!(parsed.body, "");
    }
}
