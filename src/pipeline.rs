use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::BlogDraft;
use crate::sanitize::strip_code_fences;

/// Subject line for the success notification.
pub const SUCCESS_SUBJECT: &str = "New Blog Post Generated";

/// Subject line for failure notifications.
pub const FAILURE_SUBJECT: &str = "Blog Generation Error";

const PARSE_SNIPPET_CHARS: usize = 200;
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Fatal pipeline failures. Each one short-circuits the current invocation;
/// there is no retry, the only recovery is the next tick or HTTP call.
/// Notification failures are deliberately absent here: they are logged and
/// swallowed at the notifier call site and never affect the pipeline result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Blog generation failed: {0}")]
    Generation(String),

    #[error("Failed to parse generated content as JSON: {message} (content: {snippet})")]
    Parse { message: String, snippet: String },

    #[error("Missing required fields: {0:?}")]
    Validation(Vec<String>),

    #[error("Failed to save blog post: {0}")]
    Persistence(String),
}

/// Produces raw completion text for a topic. Implemented by the OpenRouter
/// client in production.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, topic: &str, main_page_url: &str) -> anyhow::Result<String>;
}

/// Append-only record storage with server-generated keys. Implemented by the
/// Firebase Realtime Database client in production.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Appends the record and returns the generated key.
    async fn push(&self, record: &Map<String, Value>) -> anyhow::Result<String>;

    /// Deterministic read-back URL for a persisted record.
    fn record_url(&self, key: &str) -> String;
}

/// Sends a plain-text notification. Implemented by the SMTP notifier in
/// production.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// A record that made it into the database.
#[derive(Debug, Clone)]
pub struct PublishedPost {
    pub blog_id: String,
    pub firebase_url: String,
    pub title: String,
}

/// The generate → sanitize → validate → timestamp → persist → notify
/// sequence. One instance is built at startup and shared by the HTTP
/// handler, the scheduler, and the one-shot CLI command; concurrent
/// invocations are fully independent.
pub struct BlogPipeline {
    generator: Arc<dyn ContentGenerator>,
    store: Arc<dyn BlogStore>,
    notifier: Arc<dyn Notifier>,
}

impl BlogPipeline {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        store: Arc<dyn BlogStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            generator,
            store,
            notifier,
        }
    }

    /// Runs one full pipeline invocation. On failure a diagnostic
    /// notification is attempted before the error is returned to the caller.
    pub async fn run(
        &self,
        topic: &str,
        main_page_url: &str,
    ) -> Result<PublishedPost, PipelineError> {
        match self.execute(topic, main_page_url).await {
            Ok(post) => Ok(post),
            Err(err) => {
                error!("Blog pipeline failed: {err}");
                self.notify_best_effort(FAILURE_SUBJECT, &err.to_string())
                    .await;
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        topic: &str,
        main_page_url: &str,
    ) -> Result<PublishedPost, PipelineError> {
        info!("Starting blog generation for topic: {topic}");

        let raw = self
            .generator
            .generate(topic, main_page_url)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        let cleaned = strip_code_fences(&raw);

        let mut draft = BlogDraft::from_json(&cleaned).map_err(|e| PipelineError::Parse {
            message: e.to_string(),
            snippet: truncate_chars(&cleaned, PARSE_SNIPPET_CHARS),
        })?;

        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(PipelineError::Validation(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }
        info!("All required fields present in blog data");

        draft.attach_timestamp(Utc::now());

        let blog_id = self
            .store
            .push(draft.as_map())
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        let firebase_url = self.store.record_url(&blog_id);
        info!("Blog post saved with ID: {blog_id}");

        let title = draft.title().unwrap_or("(untitled)").to_string();
        let body = format!(
            "New Blog Post!\nTitle: {title}\nDescription: {}...\nView: {firebase_url}",
            truncate_chars(draft.description().unwrap_or(""), DESCRIPTION_PREVIEW_CHARS),
        );
        self.notify_best_effort(SUCCESS_SUBJECT, &body).await;

        Ok(PublishedPost {
            blog_id,
            firebase_url,
            title,
        })
    }

    /// Losing a notification is tolerable; losing visibility into the
    /// pipeline result is not. Send failures end here.
    async fn notify_best_effort(&self, subject: &str, body: &str) {
        if let Err(e) = self.notifier.send(subject, body).await {
            warn!("Failed to send notification '{subject}': {e}");
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
