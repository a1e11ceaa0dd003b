//! Customer name from an external entity recognition service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::bill::text::BillText;
use crate::error::NameError;
use crate::models::bill::NameSource;

use super::{EntityRecognizer, NameStrategy};

/// Asks the recognizer for person entities around the customer block.
///
/// The call is bounded by `timeout`; running out of time is reported as
/// [`NameError::Timeout`] so the chain can move on.
pub struct EntityRecognitionStrategy {
    recognizer: Arc<dyn EntityRecognizer>,
    language: String,
    timeout: Duration,
    anchors: Vec<String>,
    radius: usize,
    snippet_lines: usize,
}

impl EntityRecognitionStrategy {
    pub fn new(
        recognizer: Arc<dyn EntityRecognizer>,
        language: impl Into<String>,
        timeout: Duration,
        anchors: Vec<String>,
        radius: usize,
    ) -> Self {
        Self {
            recognizer,
            language: language.into(),
            timeout,
            anchors,
            radius,
            snippet_lines: 40,
        }
    }

    /// Lines sent when no anchor phrase is present.
    pub fn with_snippet_lines(mut self, lines: usize) -> Self {
        self.snippet_lines = lines;
        self
    }

    /// Text sent to the service: the anchor neighborhood, or the top of the
    /// document when no anchor is present.
    fn snippet(&self, text: &BillText) -> String {
        let anchored = self
            .anchors
            .iter()
            .find_map(|anchor| text.find_line(anchor));

        match anchored {
            Some(center) => text.window(center, self.radius).join("\n"),
            None => text
                .lines()
                .take(self.snippet_lines)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[async_trait]
impl NameStrategy for EntityRecognitionStrategy {
    fn source(&self) -> NameSource {
        NameSource::EntityRecognition
    }

    async fn resolve(&self, text: &BillText) -> Result<String, NameError> {
        let snippet = self.snippet(text);
        if snippet.trim().is_empty() {
            return Err(NameError::NoEntity);
        }

        trace!("Sending {} chars to entity recognition", snippet.len());
        let entities = tokio::time::timeout(
            self.timeout,
            self.recognizer.recognize(&snippet, &self.language),
        )
        .await
        .map_err(|_| NameError::Timeout(self.timeout))??;

        debug!("Entity recognition returned {} entities", entities.len());

        entities
            .into_iter()
            .filter(|e| e.is_person())
            .map(|e| e.text.trim().to_string())
            .find(|name| !name.is_empty())
            .ok_or(NameError::NoEntity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::names::mock::MockRecognizer;
    use crate::bill::names::Entity;

    fn strategy(recognizer: MockRecognizer) -> EntityRecognitionStrategy {
        EntityRecognitionStrategy::new(
            Arc::new(recognizer),
            "pt",
            Duration::from_millis(100),
            vec!["ANCHOR".to_string()],
            1,
        )
    }

    #[test]
    fn test_snippet_uses_anchor_window() {
        let s = strategy(MockRecognizer::answering(vec![]));
        let text = BillText::new("top\nabove\nANCHOR\nbelow\nbottom");
        assert_eq!(s.snippet(&text), "above\nANCHOR\nbelow");
    }

    #[test]
    fn test_snippet_without_anchor_takes_top_lines() {
        let s = strategy(MockRecognizer::answering(vec![])).with_snippet_lines(2);
        let text = BillText::new("one\ntwo\nthree");
        assert_eq!(s.snippet(&text), "one\ntwo");
    }

    #[tokio::test]
    async fn test_first_person_wins() {
        let s = strategy(MockRecognizer::answering(vec![
            Entity::new("PERSON", "  "),
            Entity::new("ORG", "ACME"),
            Entity::new("PERSON", " João Pereira "),
            Entity::new("PERSON", "Second Person"),
        ]));

        let name = s.resolve(&BillText::new("ANCHOR")).await.unwrap();
        assert_eq!(name, "João Pereira");
    }

    #[tokio::test]
    async fn test_empty_text_is_not_sent() {
        let s = strategy(MockRecognizer::answering(vec![Entity::new("PERSON", "Ghost")]));
        assert_eq!(s.resolve(&BillText::new("")).await, Err(NameError::NoEntity));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let s = strategy(MockRecognizer::hanging(Duration::from_secs(5)));
        assert_eq!(
            s.resolve(&BillText::new("ANCHOR")).await,
            Err(NameError::Timeout(Duration::from_millis(100)))
        );
    }
}
