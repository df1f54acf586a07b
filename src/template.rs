//! Note templates.
//!
//! Templates are plain strings with `{title}`, `{timestamp}`, `{project}`,
//! and `{content}` placeholders. Substitution is a single left-to-right
//! pass: substituted values are never re-scanned, and any other `{...}`
//! sequence is copied through verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ProjectConfig;

/// Template used when a config has no entry for the requested type.
pub const PASSTHROUGH_TEMPLATE: &str = "{content}";

/// `strftime` format for the `{timestamp}` placeholder.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of note being saved; selects the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Report,
    Review,
    #[default]
    Note,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Report, ContentType::Review, ContentType::Note];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Report => "report",
            ContentType::Review => "review",
            ContentType::Note => "note",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown content type '{}': expected report, review, or note", s))
    }
}

/// Values available to a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub title: &'a str,
    pub timestamp: &'a str,
    pub project: &'a str,
    pub content: &'a str,
}

impl<'a> TemplateVars<'a> {
    fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "title" => Some(self.title),
            "timestamp" => Some(self.timestamp),
            "project" => Some(self.project),
            "content" => Some(self.content),
            _ => None,
        }
    }
}

/// Fill `template` with `vars`.
pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len() + vars.content.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                match vars.lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                // Lone `{` (or `{` directly followed by another `{`).
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render a note body using the config's template for `content_type`,
/// or the content alone when the config has none.
pub fn render_note(
    config: &ProjectConfig,
    content_type: ContentType,
    vars: &TemplateVars<'_>,
) -> String {
    let template = config
        .template_for(content_type)
        .unwrap_or(PASSTHROUGH_TEMPLATE);
    render(template, vars)
}
