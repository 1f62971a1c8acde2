//! `supportdesk chat`: interactive REPL.
//!
//! Reads a line, routes it, streams the answer back. Slash-commands switch
//! the model and toggle the video and error-diagnosis options.

use sd_domain::config::Config;
use sd_domain::request::RequestOptions;
use sd_providers::ResponseRouter;

use super::ask::print_outcome;
use crate::bootstrap::{self, StdoutSink};

/// Mutable state carried between REPL turns.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub model: String,
    pub video: bool,
    pub error_mode: bool,
}

impl ChatState {
    fn options(&self) -> RequestOptions {
        RequestOptions {
            generate_video: self.video,
            is_error: self.error_mode,
            ..Default::default()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(config: &Config, model: Option<String>) -> anyhow::Result<()> {
    let router = bootstrap::build_router(config)?;
    let mut state = ChatState {
        model: model.unwrap_or_else(|| config.llm.chat.default_model.clone()),
        video: false,
        error_mode: false,
    };

    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".supportdesk")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    let flags = router.probe().probe();
    eprintln!("SupportDesk interactive chat");
    eprintln!(
        "Model: {}  |  chat key: {}  |  multimodal key: {}",
        state.model,
        yes_no(flags.has_cloud_chat_key),
        yes_no(flags.has_multimodal_key),
    );
    eprintln!("Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &mut state, &router) {
                        break;
                    }
                    continue;
                }

                send_message(&router, &state, trimmed).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command. Returns `true` if the REPL should exit.
pub fn handle_slash_command(input: &str, state: &mut ChatState, router: &ResponseRouter) -> bool {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    match cmd {
        "/exit" | "/quit" => return true,

        "/model" => match arg {
            Some(name) => {
                if router.catalog().get(name).is_none() {
                    eprintln!("Unknown model '{name}', it will be answered locally.");
                }
                state.model = name.to_string();
                eprintln!("Model set to: {name}");
            }
            None => {
                eprintln!("Current model: {}", state.model);
                eprintln!("Usage: /model <id>  (see `supportdesk models`)");
            }
        },

        "/video" => {
            state.video = !state.video;
            eprintln!("Video generation: {}", if state.video { "on" } else { "off" });
        }

        "/error" => {
            state.error_mode = !state.error_mode;
            eprintln!(
                "Error diagnosis mode: {}",
                if state.error_mode { "on" } else { "off" }
            );
        }

        "/clear" => {
            eprint!("\x1B[2J\x1B[1;1H");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /model <id>     Switch model");
            eprintln!("  /video          Toggle video generation");
            eprintln!("  /error          Toggle error diagnosis mode");
            eprintln!("  /clear          Clear the screen");
            eprintln!("  /exit, /quit    Exit the chat");
            eprintln!("  /help           Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message sending
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn send_message(router: &ResponseRouter, state: &ChatState, message: &str) {
    let stdout = StdoutSink::new();
    let sink = |chunk: &str| stdout.push(chunk);
    let result = router
        .get_response(message, &state.model, Some(&sink), &state.options())
        .await;
    print_outcome(&result, stdout.wrote_anything());
    println!();
}
