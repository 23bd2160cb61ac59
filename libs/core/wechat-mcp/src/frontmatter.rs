//! Front-matter splitting for incoming Markdown.

use crate::types::ParsedArticle;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

static FRONT_MATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn front_matter_regex() -> &'static Regex {
    FRONT_MATTER_REGEX
        .get_or_init(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---\s*\n(.*)$").expect("valid regex"))
}

/// Recognized front-matter fields; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    cover: Option<String>,
}

/// Split an optional leading `---` YAML block off a Markdown document.
///
/// Without a front-matter block the input comes back verbatim as the body
/// with both optional fields empty. Body content and whitespace outside the
/// block are never altered. A well-delimited block whose YAML does not parse
/// is treated the same as no block at all: publishing is never failed over
/// unreadable metadata.
pub fn split(raw: &str) -> ParsedArticle {
    let Some(captures) = front_matter_regex().captures(raw) else {
        return ParsedArticle {
            title: None,
            cover: None,
            body: raw.to_string(),
        };
    };

    let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

    match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(front) => ParsedArticle {
            title: front.title.filter(|t| !t.trim().is_empty()),
            cover: front.cover.filter(|c| !c.trim().is_empty()),
            body: body.to_string(),
        },
        Err(err) => {
            tracing::warn!("ignoring unparseable front matter: {err}");
            ParsedArticle {
                title: None,
                cover: None,
                body: raw.to_string(),
            }
        }
    }
}
