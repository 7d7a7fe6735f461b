use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub main_page_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub blog_id: String,
    pub firebase_url: String,
}

/// `POST /generate-blog` — runs one pipeline invocation on demand.
///
/// The `Json` rejection is handled here rather than left to axum's default
/// so a wrong content type maps to 415 and a bad body to 400, each with the
/// `{"error": …}` shape the rest of the surface uses.
pub async fn generate_blog(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;

    let topic = request
        .topic
        .unwrap_or_else(|| state.config.content.default_topic.clone());
    let main_page_url = request
        .main_page_url
        .unwrap_or_else(|| state.config.content.default_main_page_url.clone());

    let post = state.pipeline.run(&topic, &main_page_url).await?;

    Ok(Json(GenerateResponse {
        message: "Blog post generated and saved successfully".to_string(),
        blog_id: post.blog_id,
        firebase_url: post.firebase_url,
    }))
}
