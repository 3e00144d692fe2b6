//! Publish/subscribe capabilities consumed by the relay
//!
//! The relay only needs to create a publisher for a topic and to register a
//! callback on a topic. Callbacks may be invoked on any thread, concurrently
//! for different topics, and for some transports concurrently for the same
//! topic.

pub mod local;

use crate::common::types::Float64;
use crate::error::Result;

pub use self::local::{LocalBus, LocalPublisher, LocalSubscription};

/// Handle used to send messages on one topic
pub trait TopicPublisher: Send + Sync {
    fn publish(&self, message: &Float64) -> Result<()>;
}

/// A message bus carrying `Float64` samples.
///
/// Dropping a returned publisher or subscription handle releases it.
pub trait MessageBus {
    type Publisher: TopicPublisher + 'static;
    type Subscription: Send + 'static;

    fn create_publisher(&self, topic: &str) -> Result<Self::Publisher>;

    fn create_subscription<F>(&self, topic: &str, callback: F) -> Result<Self::Subscription>
    where
        F: Fn(Float64) + Send + Sync + 'static;
}
