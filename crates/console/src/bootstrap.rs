//! Wiring shared by every subcommand that talks to a provider.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sd_domain::config::Config;
use sd_providers::{ChatBackend, EnvCredentials, ResponseRouter};

/// Build the production router: keys come from the process environment
/// and are re-read on every request.
pub fn build_router(config: &Config) -> anyhow::Result<Arc<ResponseRouter>> {
    let router = ResponseRouter::from_config(config, Arc::new(EnvCredentials))?;
    tracing::debug!(
        models = router.catalog().len(),
        chat_provider = router.chat_backend().provider_id(),
        multimodal_provider = router.multimodal().provider_id(),
        "router ready"
    );
    Ok(Arc::new(router))
}

/// Chunk sink that writes straight to stdout and remembers whether any
/// output was produced.
#[derive(Debug, Default)]
pub struct StdoutSink {
    wrote: AtomicBool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        print!("{chunk}");
        std::io::stdout().flush().ok();
        self.wrote.store(true, Ordering::Relaxed);
    }

    pub fn wrote_anything(&self) -> bool {
        self.wrote.load(Ordering::Relaxed)
    }
}
