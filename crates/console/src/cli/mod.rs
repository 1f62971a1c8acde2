pub mod ask;
pub mod chat;
pub mod config;
pub mod models;
pub mod probe;
pub mod triage;
pub mod video;

use std::path::Path;

use clap::{Parser, Subcommand};
use sd_domain::request::VideoType;

/// SupportDesk: IT-support answers from cloud, multimodal and local models.
#[derive(Debug, Parser)]
#[command(name = "supportdesk", version, about)]
pub struct Cli {
    /// Emit logs as JSON lines instead of compact text.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a single message and print the response.
    Ask {
        /// The message to send.
        message: String,
        /// Model id (defaults to the configured chat model).
        #[arg(long)]
        model: Option<String>,
        /// Output the full result as JSON instead of streaming text.
        #[arg(long)]
        json: bool,
        /// Force the video path.
        #[arg(long)]
        video: bool,
        /// The message describes an error the user is seeing.
        #[arg(long)]
        error: bool,
    },
    /// Interactive chat (default when no subcommand is given).
    Chat {
        /// Starting model id.
        #[arg(long)]
        model: Option<String>,
    },
    /// List the model catalog.
    Models {
        #[arg(long)]
        json: bool,
    },
    /// Report which provider keys are configured.
    Probe {
        #[arg(long)]
        json: bool,
    },
    /// Classify a ticket into category, priority and summary.
    Triage {
        /// Ticket text.
        message: String,
        /// Chat model to use.
        #[arg(long)]
        model: Option<String>,
    },
    /// Generate a video script and render a placeholder video.
    Video {
        /// What the video should cover.
        message: String,
        /// Screenshot to send along with the request.
        #[arg(long)]
        image: Option<std::path::PathBuf>,
        /// howto, tutorial, troubleshooting or overview.
        #[arg(long = "type", default_value = "howto")]
        video_type: VideoType,
        /// Output the generation as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `SD_CONFIG` (or
/// `supportdesk.toml` by default). Returns the parsed config and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(sd_domain::config::Config, String)> {
    let config_path =
        std::env::var("SD_CONFIG").unwrap_or_else(|_| "supportdesk.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path`, or return the defaults when the file does not exist.
pub fn load_config_from(path: impl AsRef<Path>) -> anyhow::Result<sd_domain::config::Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(sd_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}
