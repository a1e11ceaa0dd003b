//! HTTP client for an external named-entity recognition service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fatura_core::bill::{Entity, EntityRecognizer};
use fatura_core::models::config::NerConfig;
use fatura_core::NameError;

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
    language: &'a str,
}

/// Services answer with either a bare list or a wrapped one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NerResponse {
    List(Vec<Entity>),
    Wrapped { entities: Vec<Entity> },
}

impl NerResponse {
    fn into_entities(self) -> Vec<Entity> {
        match self {
            NerResponse::List(entities) | NerResponse::Wrapped { entities } => entities,
        }
    }
}

/// Posts `{"text", "language"}` as JSON and reads back the entity list.
pub struct HttpEntityRecognizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEntityRecognizer {
    /// The client timeout is a backstop; the parser applies its own bound.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fatura-cli/0.1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl EntityRecognizer for HttpEntityRecognizer {
    async fn recognize(&self, snippet: &str, language: &str) -> Result<Vec<Entity>, NameError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NerRequest {
                text: snippet,
                language,
            })
            .send()
            .await
            .map_err(|e| NameError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NameError::Service(format!("HTTP {}", response.status())));
        }

        let body: NerResponse = response
            .json()
            .await
            .map_err(|e| NameError::Service(format!("invalid response: {}", e)))?;

        let entities = body.into_entities();
        debug!("{} returned {} entities", self.endpoint, entities.len());
        Ok(entities)
    }
}

/// Recognizer for the configured service, if one is enabled.
pub fn recognizer_from_config(
    config: &NerConfig,
) -> anyhow::Result<Option<Arc<dyn EntityRecognizer>>> {
    let endpoint = match (&config.endpoint, config.enabled) {
        (Some(endpoint), true) if !endpoint.trim().is_empty() => endpoint,
        (_, true) => anyhow::bail!("Entity recognition is enabled but ner.endpoint is not set"),
        _ => return Ok(None),
    };

    info!("Using entity recognition service at {}", endpoint);
    // Leave headroom so the parser's own timeout fires first
    let backstop = Duration::from_millis(config.timeout_ms.saturating_mul(2).max(1000));
    let recognizer = HttpEntityRecognizer::new(endpoint.as_str(), backstop)?;
    Ok(Some(Arc::new(recognizer)))
}
