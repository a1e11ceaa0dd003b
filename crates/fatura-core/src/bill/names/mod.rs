//! Customer and distributor name resolution.
//!
//! The customer name goes through an ordered chain of strategies where the
//! first success wins. Entity recognition, when configured, runs first; the
//! legal-suffix line search is the fallback. A failing strategy is logged
//! and skipped, never propagated.

mod distributor;
mod entity;
mod suffix;

pub use distributor::{DistributorMatcher, KNOWN_DISTRIBUTORS};
pub use entity::EntityRecognitionStrategy;
pub use suffix::LegalSuffixStrategy;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bill::text::BillText;
use crate::error::NameError;
use crate::models::bill::NameSource;

/// An entity returned by a recognition service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity type as reported by the service.
    #[serde(rename = "type", alias = "kind", alias = "label")]
    pub kind: String,
    /// Entity text.
    pub text: String,
}

impl Entity {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }

    /// Whether the entity denotes a person.
    pub fn is_person(&self) -> bool {
        let kind = self.kind.trim();
        kind.eq_ignore_ascii_case("person") || kind.eq_ignore_ascii_case("per")
    }
}

/// Named-entity recognition service.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Entities found in `snippet`, in the order the service reports them.
    async fn recognize(&self, snippet: &str, language: &str) -> Result<Vec<Entity>, NameError>;
}

/// One way of finding the customer name.
#[async_trait]
pub trait NameStrategy: Send + Sync {
    /// Which strategy this is, for record metadata.
    fn source(&self) -> NameSource;

    /// Try to produce a name from the bill text.
    async fn resolve(&self, text: &BillText) -> Result<String, NameError>;
}

/// A customer name and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub source: NameSource,
}

/// Output of the name resolution stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedNames {
    pub customer: Option<ResolvedName>,
    pub distributor: Option<String>,
}

/// Ordered strategy chain for the customer name.
#[derive(Clone, Default)]
pub struct NameResolver {
    strategies: Vec<Arc<dyn NameStrategy>>,
}

impl NameResolver {
    /// A resolver with no strategies; it never finds a name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy to the end of the chain.
    pub fn with_strategy(mut self, strategy: Arc<dyn NameStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run the chain; `None` when every strategy fails.
    pub async fn resolve(&self, text: &BillText) -> Option<ResolvedName> {
        for strategy in &self.strategies {
            let source = strategy.source();
            match strategy.resolve(text).await {
                Ok(name) => {
                    debug!("Customer name resolved via {:?}", source);
                    return Some(ResolvedName { name, source });
                }
                Err(e @ (NameError::Timeout(_) | NameError::Service(_))) => {
                    warn!("Name resolution degraded, {:?} failed: {}", source, e);
                }
                Err(e) => {
                    debug!("{:?} found no name: {}", source, e);
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for NameResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<NameSource> = self.strategies.iter().map(|s| s.source()).collect();
        f.debug_struct("NameResolver").field("strategies", &sources).finish()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::time::Duration;

    /// Recognizer answering with a fixed outcome, optionally after a delay.
    pub struct MockRecognizer {
        pub outcome: Result<Vec<Entity>, NameError>,
        pub delay: Option<Duration>,
    }

    impl MockRecognizer {
        pub fn answering(entities: Vec<Entity>) -> Self {
            Self {
                outcome: Ok(entities),
                delay: None,
            }
        }

        pub fn failing() -> Self {
            Self {
                outcome: Err(NameError::Service("connection refused".to_string())),
                delay: None,
            }
        }

        pub fn hanging(delay: Duration) -> Self {
            Self {
                outcome: Ok(vec![Entity::new("PERSON", "Too Late")]),
                delay: Some(delay),
            }
        }
    }

    #[async_trait]
    impl EntityRecognizer for MockRecognizer {
        async fn recognize(&self, _snippet: &str, _language: &str) -> Result<Vec<Entity>, NameError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }
}
