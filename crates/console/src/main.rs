use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sd_console::cli::ask::AskArgs;
use sd_console::cli::video::VideoArgs;
use sd_console::cli::{self, Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        // Default to chat when no subcommand is given.
        None => {
            let (config, _) = cli::load_config()?;
            cli::chat::chat(&config, None).await
        }
        Some(Command::Chat { model }) => {
            let (config, _) = cli::load_config()?;
            cli::chat::chat(&config, model).await
        }
        Some(Command::Ask { message, model, json, video, error }) => {
            let (config, _) = cli::load_config()?;
            let args = AskArgs { message, model, json, video, error };
            if !cli::ask::run(&config, args).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Models { json }) => {
            let (config, _) = cli::load_config()?;
            cli::models::run(&config, json)
        }
        Some(Command::Probe { json }) => {
            let (config, _) = cli::load_config()?;
            cli::probe::run(&config, json)
        }
        Some(Command::Triage { message, model }) => {
            let (config, _) = cli::load_config()?;
            cli::triage::run(&config, message, model).await
        }
        Some(Command::Video { message, image, video_type, json }) => {
            let (config, _) = cli::load_config()?;
            let args = VideoArgs { message, image, video_type, json };
            cli::video::run(&config, args).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cli::load_config()?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = cli::load_config()?;
            cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("supportdesk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Logs go to stderr so streamed answers on stdout stay clean.
///
/// Defaults to `warn`; `RUST_LOG=sd_providers=info` shows the routing
/// trace events.
fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
