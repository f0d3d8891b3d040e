//! # Change Publication
//!
//! Every committed product write is announced on a topic: the decorated view
//! after create, edit, discount and stock changes, and `{ "deletedId": .. }`
//! after a delete. Publishing is fire-and-forget. A failed publish is logged
//! by the caller and never undoes the write it reports.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::{ProductId, ProductView};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CatalogMessage {
    Updated(ProductView),
    Deleted {
        #[serde(rename = "deletedId")]
        deleted_id: ProductId,
    },
}

/// A message together with the topic it was published on.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub topic: String,
    pub message: CatalogMessage,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PublishError {
    #[error("Publisher closed")]
    Closed,

    #[error("Publisher rejected message: {0}")]
    Rejected(String),
}

pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, message: CatalogMessage) -> Result<(), PublishError>;
}

/// Fans publications out to every live subscriber.
///
/// Subscribers that fall behind by more than the channel capacity lose the
/// oldest messages. Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<Publication>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Publication> {
        self.sender.subscribe()
    }
}

impl Publisher for BroadcastPublisher {
    fn publish(&self, topic: &str, message: CatalogMessage) -> Result<(), PublishError> {
        let publication = Publication {
            topic: topic.to_string(),
            message,
        };
        match self.sender.send(publication) {
            Ok(receivers) => debug!(topic, receivers, "Published"),
            Err(_) => debug!(topic, "Published with no subscribers"),
        }
        Ok(())
    }
}

/// Keeps every publication in memory, for tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    published: Arc<Mutex<Vec<Publication>>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Publication> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }
}

impl Publisher for InMemoryPublisher {
    fn publish(&self, topic: &str, message: CatalogMessage) -> Result<(), PublishError> {
        let mut published = self
            .published
            .lock()
            .map_err(|e| PublishError::Rejected(e.to_string()))?;
        published.push(Publication {
            topic: topic.to_string(),
            message,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deletion_serializes_as_deleted_id() {
        let message = CatalogMessage::Deleted {
            deleted_id: ProductId(4),
        };

        assert_eq!(serde_json::to_value(&message).unwrap(), json!({ "deletedId": 4 }));
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let publisher = BroadcastPublisher::new(8);
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();

        publisher
            .publish("/topic/inventory", CatalogMessage::Deleted { deleted_id: ProductId(1) })
            .unwrap();

        for rx in [&mut first, &mut second] {
            let publication = rx.recv().await.unwrap();
            assert_eq!(publication.topic, "/topic/inventory");
            assert_eq!(publication.message, CatalogMessage::Deleted { deleted_id: ProductId(1) });
        }
    }

    #[test]
    fn publishing_without_subscribers_succeeds() {
        let publisher = BroadcastPublisher::new(8);
        let result = publisher.publish("/topic/inventory", CatalogMessage::Deleted { deleted_id: ProductId(2) });
        assert!(result.is_ok());
    }
}
