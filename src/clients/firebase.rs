use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::FirebaseConfig;
use crate::pipeline::BlogStore;

/// Collection the pipeline appends to. Records are immutable once written;
/// no update or delete path exists.
pub const BLOG_POSTS_PATH: &str = "blog_posts";

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// REST client for a Firebase Realtime Database.
///
/// A POST to `{database_url}/{path}.json` is Firebase's push operation: it
/// atomically generates a new chronologically-sortable key and writes the
/// body under it, returning the key as `{"name": …}`.
#[derive(Clone)]
pub struct FirebaseClient {
    client: Client,
    database_url: String,
    auth_token: Option<String>,
}

impl FirebaseClient {
    pub fn with_shared_client(client: Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            auth_token: if config.auth_token.is_empty() {
                None
            } else {
                Some(config.auth_token.clone())
            },
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}.json", self.database_url, BLOG_POSTS_PATH)
    }
}

#[async_trait]
impl BlogStore for FirebaseClient {
    async fn push(&self, record: &Map<String, Value>) -> Result<String> {
        let mut request = self.client.post(self.collection_url()).json(record);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Firebase error: {status} - {body}"));
        }

        let pushed: PushResponse = response.json().await?;
        info!("Pushed record to {} as {}", BLOG_POSTS_PATH, pushed.name);
        Ok(pushed.name)
    }

    fn record_url(&self, key: &str) -> String {
        format!("{}/{}/{}.json", self.database_url, BLOG_POSTS_PATH, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FirebaseConfig;

    fn client(database_url: &str) -> FirebaseClient {
        FirebaseClient::with_shared_client(
            Client::new(),
            &FirebaseConfig {
                database_url: database_url.to_string(),
                auth_token: String::new(),
            },
        )
    }

    #[test]
    fn record_url_concatenates_base_path_and_key() {
        let firebase = client("https://demo-default-rtdb.firebaseio.com");
        assert_eq!(
            firebase.record_url("-NabcDEF123"),
            "https://demo-default-rtdb.firebaseio.com/blog_posts/-NabcDEF123.json"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let firebase = client("https://demo-default-rtdb.firebaseio.com/");
        assert_eq!(
            firebase.collection_url(),
            "https://demo-default-rtdb.firebaseio.com/blog_posts.json"
        );
    }

    #[test]
    fn push_response_deserializes() {
        let pushed: PushResponse = serde_json::from_str(r#"{"name":"-NxYz"}"#).unwrap();
        assert_eq!(pushed.name, "-NxYz");
    }
}
