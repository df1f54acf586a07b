//! YAML front matter prepended to every saved note.

use chrono::SecondsFormat;

use crate::Timestamp;

/// Value of the `source:` field.
pub const SOURCE_TAG: &str = "claude-code";

/// Build the front matter block, including the blank line that separates
/// it from the body.
///
/// ```text
/// ---
/// created: 2024-05-17T08:03:09+00:00
/// source: claude-code
/// tags: ['claude-code', 'note']
/// ---
///
/// ```
pub fn front_matter(tags: &[String], now: &Timestamp) -> String {
    format!(
        "---\ncreated: {}\nsource: {}\ntags: {}\n---\n\n",
        now.to_rfc3339_opts(SecondsFormat::Secs, false),
        SOURCE_TAG,
        render_tag_list(tags)
    )
}

/// Render tags as a flow list of single-quoted scalars: `['a', 'b']`.
///
/// Order and duplicates are preserved. An embedded `'` is doubled, which is
/// how YAML escapes inside single quotes.
pub fn render_tag_list(tags: &[String]) -> String {
    let items: Vec<String> = tags
        .iter()
        .map(|t| format!("'{}'", t.replace('\'', "''")))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Split a note into its leading front matter block and the body.
///
/// Returns `None` when `note` does not start with a `---` block.
pub fn split_front_matter(note: &str) -> Option<(&str, &str)> {
    let rest = note.strip_prefix("---\n")?;
    let end = rest.find("\n---\n")?;
    let header_len = "---\n".len() + end + "\n---\n".len();
    let (header, body) = note.split_at(header_len);
    Some((header, body.strip_prefix('\n').unwrap_or(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn at() -> Timestamp {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .unwrap()
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_format() {
        let fm = front_matter(&tags(&["claude-code", "note", "my-app"]), &at());
        assert_eq!(
            fm,
            "---\ncreated: 2024-01-02T03:04:05+02:00\nsource: claude-code\ntags: ['claude-code', 'note', 'my-app']\n---\n\n"
        );
    }

    #[test]
    fn test_tag_list_order_and_duplicates() {
        assert_eq!(render_tag_list(&[]), "[]");
        assert_eq!(render_tag_list(&tags(&["b", "a", "b"])), "['b', 'a', 'b']");
        assert_eq!(render_tag_list(&tags(&["it's"])), "['it''s']");
    }

    #[test]
    fn test_split_front_matter() {
        let note = format!("{}# Title\n\nbody", front_matter(&tags(&["x"]), &at()));
        let (header, body) = split_front_matter(&note).unwrap();
        assert!(header.starts_with("---\ncreated: "));
        assert!(header.ends_with("---\n"));
        assert_eq!(body, "# Title\n\nbody");
        assert!(split_front_matter("no header").is_none());
    }
}
