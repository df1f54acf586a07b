//! # obsidian-mcp CLI
//!
//! The `obsidian-mcp` binary runs the MCP server and carries the small
//! companion commands around it.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `obsidian-mcp serve` | Run the MCP server on stdio (what Claude Code launches) |
//! | `obsidian-mcp install --vault <dir>` | Register the server in `~/.claude/settings.json` |
//! | `obsidian-mcp init-project` | Create `.claude/obsidian.json` for a project |
//! | `obsidian-mcp hook` | Queue a hook event's content under `~/.claude/mcp_queue` |
//! | `obsidian-mcp list` | List notes in the vault |
//! | `obsidian-mcp tree` | Print the vault folder tree |
//! | `obsidian-mcp read <url>` | Print the note behind an `obsidian://` URL |
//!
//! ## Examples
//!
//! ```bash
//! # One-time setup
//! obsidian-mcp install --vault ~/Documents/Notes
//!
//! # Per-project folder and templates
//! cd ~/code/webapp && obsidian-mcp init-project --folder "Projects/Webapp"
//!
//! # Inspect what has been saved
//! obsidian-mcp --vault ~/Documents/Notes list --folder "Projects/Webapp"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use obsidian_mcp::hook::{default_queue_dir, run_hook, HookReply};
use obsidian_mcp::install::{
    claude_dir, default_vault_path, init_project_config, register_server, write_env_file,
    ServerRegistration,
};
use obsidian_mcp::tools::{ToolContext, ToolRegistry};
use obsidian_mcp::{logging, server, Vault};

/// Save Claude Code output into an Obsidian vault over MCP.
#[derive(Parser)]
#[command(name = "obsidian-mcp", version, about)]
struct Cli {
    /// Vault root directory. Defaults to `~/Documents/ObsidianVault`.
    #[arg(long, global = true, env = "OBSIDIAN_VAULT_PATH")]
    vault: Option<PathBuf>,

    /// Directory used to discover `.claude/obsidian.json`. Defaults to the
    /// current directory.
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter, e.g. `debug` or `obsidian_mcp=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout.
    Serve,

    /// Register the server with Claude Code.
    ///
    /// Adds an `obsidian-claude-code` entry under `mcpServers` in the
    /// settings file and writes `obsidian.env` next to it. The vault
    /// directory is created if it does not exist.
    Install {
        /// Settings file to patch. Defaults to `~/.claude/settings.json`.
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Command Claude Code should run. Defaults to this executable.
        #[arg(long)]
        command: Option<String>,
    },

    /// Create `.claude/obsidian.json` in a project directory.
    InitProject {
        /// Project directory. Defaults to `--cwd` or the current directory.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Vault folder for this project. Defaults to `Projects/<dir name>`.
        #[arg(long)]
        folder: Option<String>,
    },

    /// Read a hook event from stdin and queue its content.
    ///
    /// Always prints `{"allow": true, ...}` and exits successfully.
    Hook {
        /// Queue directory. Defaults to `~/.claude/mcp_queue`.
        #[arg(long)]
        queue_dir: Option<PathBuf>,
    },

    /// List notes in the vault.
    List {
        /// Folder relative to the vault root.
        #[arg(long, default_value = "")]
        folder: String,

        /// Maximum number of files.
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Print the vault folder tree.
    Tree {
        /// Levels to descend.
        #[arg(long, default_value_t = 3)]
        max_depth: usize,
    },

    /// Print the note behind an `obsidian://` URL.
    Read {
        /// `obsidian://open?vault=...&file=...`
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json)?;

    let cwd = match cli.cwd {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("Failed to resolve --cwd {}", dir.display()))?,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let vault_root = match cli.vault {
        Some(path) => path,
        None => default_vault_path()?,
    };
    let ctx = ToolContext::new(vault_root, cwd.clone());

    match cli.command {
        Commands::Serve => {
            server::run_server(ctx).await?;
        }
        Commands::Install { settings, command } => {
            let vault = Vault::open(ctx.vault_root())
                .with_context(|| format!("Failed to create vault at {}", ctx.vault_root().display()))?;
            let settings = match settings {
                Some(path) => path,
                None => claude_dir()?.join("settings.json"),
            };
            let command = match command {
                Some(command) => command,
                None => std::env::current_exe()
                    .context("Failed to locate this executable")?
                    .display()
                    .to_string(),
            };

            let outcome = register_server(
                &settings,
                &ServerRegistration {
                    command,
                    args: vec!["serve".to_string()],
                    vault: vault.root().to_path_buf(),
                },
            )?;
            if let Some(backup) = &outcome.backup {
                println!("Settings were not valid JSON; backup saved to {}", backup.display());
            }
            println!("Registered obsidian-claude-code in {}", outcome.settings.display());

            let env_dir = settings
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let env_file = write_env_file(&env_dir, vault.root())?;
            println!("Wrote {}", env_file.display());
            println!("Notes will be saved to: {}", vault.root().display());
            println!("Restart Claude Code to load the server.");
        }
        Commands::InitProject { dir, folder } => {
            let dir = dir.unwrap_or(cwd);
            let init = init_project_config(&dir, folder.as_deref())?;
            if init.created {
                println!("Created project config: {}", init.path.display());
                println!("Notes for this project go to: {}", init.folder);
            } else {
                println!("Project config already exists: {}", init.path.display());
            }
        }
        Commands::Hook { queue_dir } => {
            let mut input = String::new();
            let read = std::io::stdin().read_to_string(&mut input);
            let queue_dir = match queue_dir {
                Some(dir) => Ok(dir),
                None => default_queue_dir(),
            };
            let reply = match (read, queue_dir) {
                (Ok(_), Ok(dir)) => run_hook(&input, &dir, &obsidian_mcp::now()),
                (Err(e), _) => HookReply {
                    allow: true,
                    message: format!("Hook error: {}", e),
                },
                (_, Err(e)) => HookReply {
                    allow: true,
                    message: format!("Hook error: {:#}", e),
                },
            };
            println!("{}", serde_json::to_string(&reply)?);
        }
        Commands::List { folder, limit } => {
            let params = serde_json::json!({ "folder": folder, "limit": limit });
            run_tool(&ctx, "list_vault_files", params).await?;
        }
        Commands::Tree { max_depth } => {
            let params = serde_json::json!({ "max_depth": max_depth });
            run_tool(&ctx, "get_vault_structure", params).await?;
        }
        Commands::Read { url } => {
            run_tool(&ctx, "read_obsidian_url", serde_json::json!({ "url": url })).await?;
        }
    }

    Ok(())
}

/// Run a built-in tool and print its text, so CLI output matches what the
/// assistant sees.
async fn run_tool(ctx: &ToolContext, name: &str, params: serde_json::Value) -> anyhow::Result<()> {
    let registry = ToolRegistry::with_builtins();
    let tool = registry
        .find(name)
        .ok_or_else(|| anyhow::anyhow!("no tool registered with name: {}", name))?;
    let text = tool.execute(params, ctx).await?;
    println!("{}", text.trim_end());
    Ok(())
}
