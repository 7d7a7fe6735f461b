use std::sync::Arc;

use crate::clients::firebase::FirebaseClient;
use crate::clients::openrouter::OpenRouterClient;
use crate::config::Config;
use crate::notify::SmtpNotifier;
use crate::pipeline::BlogPipeline;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused by all HTTP-based adapters for connection pooling. Per-request
/// timeouts are applied where a call needs one (the LLM request); other
/// calls use the client library defaults.
fn build_shared_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("Blogarr/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything an invocation needs, constructed once at startup and shared
/// read-only between the HTTP surface, the scheduler, and the CLI.
pub struct SharedState {
    pub config: Config,

    pub pipeline: Arc<BlogPipeline>,

    pub start_time: std::time::Instant,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client()?;

        let generator = Arc::new(OpenRouterClient::with_shared_client(
            http_client.clone(),
            &config.llm,
        ));
        let store = Arc::new(FirebaseClient::with_shared_client(
            http_client,
            &config.firebase,
        ));
        let notifier = Arc::new(SmtpNotifier::new(config.smtp.clone()));

        let pipeline = Arc::new(BlogPipeline::new(generator, store, notifier));

        Ok(Self {
            config,
            pipeline,
            start_time: std::time::Instant::now(),
        })
    }
}
