//! `supportdesk ask`: one-shot request.
//!
//! Routes a single message, streams the answer to stdout and exits with
//! status 1 when the request failed.

use sd_domain::config::Config;
use sd_domain::request::RequestOptions;
use sd_domain::response::ResponseResult;

use crate::bootstrap::{self, StdoutSink};

pub struct AskArgs {
    pub message: String,
    pub model: Option<String>,
    pub json: bool,
    pub video: bool,
    pub error: bool,
}

/// Execute one request and print the response. Returns `false` when the
/// result was a failure.
pub async fn run(config: &Config, args: AskArgs) -> anyhow::Result<bool> {
    let router = bootstrap::build_router(config)?;
    let model = args
        .model
        .unwrap_or_else(|| config.llm.chat.default_model.clone());
    let options = RequestOptions {
        generate_video: args.video,
        is_error: args.error,
        ..Default::default()
    };

    if args.json {
        let result = router
            .get_response(&args.message, &model, None, &options)
            .await;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| anyhow::anyhow!("serializing result: {e}"))?;
        println!("{json}");
        return Ok(result.success);
    }

    let stdout = StdoutSink::new();
    let sink = |chunk: &str| stdout.push(chunk);
    let result = router
        .get_response(&args.message, &model, Some(&sink), &options)
        .await;

    print_outcome(&result, stdout.wrote_anything());
    Ok(result.success)
}

/// Finish a streamed response: failures go to stderr, and content is
/// printed only when nothing was streamed.
pub(crate) fn print_outcome(result: &ResponseResult, streamed: bool) {
    if !result.success {
        if streamed {
            println!();
        }
        eprintln!("\x1b[31m{}\x1b[0m", result.content);
        return;
    }
    if !streamed {
        print!("{}", result.content);
    }
    println!();
    eprintln!("\x1b[2m{}\x1b[0m", footer(result));
}

/// One-line summary of who answered and how long it took.
pub(crate) fn footer(result: &ResponseResult) -> String {
    let mut line = format!(
        "[{} via {} in {} ms",
        result.model,
        result.service_type.as_str(),
        result.response_time_ms
    );
    if result.fallback_used {
        line.push_str(", fallback");
    }
    if result.model != result.requested_model {
        line.push_str(&format!(", requested {}", result.requested_model));
    }
    line.push(']');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_domain::response::ServiceType;

    #[test]
    fn footer_names_served_model() {
        let r = ResponseResult::succeeded("ok".into(), "mistral-7b", "mistral-7b", ServiceType::Local)
            .with_response_time(812);
        assert_eq!(footer(&r), "[mistral-7b via local in 812 ms]");
    }

    #[test]
    fn footer_marks_fallback() {
        let mut r = ResponseResult::succeeded(
            "ok".into(),
            "gemini-1.5-flash",
            "gpt-4",
            ServiceType::CloudMultimodal,
        );
        r.fallback_used = true;
        let line = footer(&r);
        assert!(line.contains(", fallback"));
        assert!(line.ends_with(", requested gpt-4]"));
    }
}
