//! # obsidian-mcp
//!
//! **Save AI assistant output into an Obsidian vault.**
//!
//! An MCP server that Claude Code launches over stdio. It exposes tools to
//! save reports, reviews, and notes as markdown files with YAML front
//! matter, to read notes back through `obsidian://` links, and to browse
//! the vault.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  stdio   ┌──────────┐   ┌──────────────────────────┐
//! │ Claude Code  │─────────▶│   MCP    │──▶│  Tools                   │
//! │  (client)    │◀─────────│  bridge  │   │  save / read / list /    │
//! └──────────────┘          └──────────┘   │  tree                    │
//!                                          └────────────┬─────────────┘
//!                                                       ▼
//!       ┌───────────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐
//!       │   .claude/    │─▶│ template │─▶│ filename │─▶│    Vault    │
//!       │ obsidian.json │  │  render  │  │ + front  │  │  (on disk)  │
//!       └───────────────┘  └──────────┘  │  matter  │  └─────────────┘
//!                                        └──────────┘
//! ```
//!
//! ## Save Pipeline
//!
//! 1. The nearest `.claude/obsidian.json` at or above the working directory
//!    is loaded ([`config`]); missing or broken files fall back to defaults.
//! 2. The template for the content type is filled ([`template`]).
//! 3. The title becomes `YYYYMMDD_HHMMSS_<title>.md` ([`filename`]).
//! 4. Front matter with creation time and tags is prepended ([`frontmatter`]).
//! 5. The note is written into the configured vault folder ([`vault`]).
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Project config discovery and defaults |
//! | [`template`] | Content types and placeholder substitution |
//! | [`filename`] | Title sanitizing and timestamped filenames |
//! | [`frontmatter`] | YAML front matter generation |
//! | [`url`] | `obsidian://` URL parsing |
//! | [`vault`] | Writes, URL reads, listing, tree view |
//! | [`notes`] | The save pipeline tying the above together |
//! | [`tools`] | `Tool` trait, built-in tools, `ToolRegistry` |
//! | [`mcp`] | rmcp `ServerHandler` bridge |
//! | [`server`] | stdio server entry point |
//! | [`install`] | Settings registration and project scaffolding |
//! | [`hook`] | Response queueing hook |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`error`] | `VaultError` |

pub mod config;
pub mod error;
pub mod filename;
pub mod frontmatter;
pub mod hook;
pub mod install;
pub mod logging;
pub mod mcp;
pub mod notes;
pub mod server;
pub mod template;
pub mod tools;
pub mod url;
pub mod vault;

pub use config::{resolve_config, ProjectConfig};
pub use error::VaultError;
pub use template::ContentType;
pub use tools::{Tool, ToolContext, ToolRegistry};
pub use vault::Vault;

/// Wall-clock reading with its UTC offset, as used in filenames and front matter.
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;

/// Current local time.
pub fn now() -> Timestamp {
    chrono::Local::now().fixed_offset()
}
