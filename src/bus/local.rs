//! In-process message bus
//!
//! Delivery is synchronous on the publishing thread. Several threads may
//! publish at once, so one subscription can see overlapping callbacks.

use super::{MessageBus, TopicPublisher};
use crate::common::types::Float64;
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback = Arc<dyn Fn(Float64) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    subscriptions: DashMap<String, Vec<(u64, Callback)>>,
    publishers: DashMap<String, usize>,
    history: Option<DashMap<String, Vec<f64>>>,
}

impl Registry {
    fn deliver(&self, topic: &str, message: Float64) -> usize {
        if let Some(history) = &self.history {
            history.entry(topic.to_string()).or_default().push(message.data);
        }

        // Callbacks are cloned out so no shard lock is held while they run;
        // a callback is free to publish on another topic.
        let callbacks: Vec<Callback> = match self.subscriptions.get(topic) {
            Some(entry) => entry.iter().map(|(_, callback)| Arc::clone(callback)).collect(),
            None => Vec::new(),
        };

        for callback in &callbacks {
            callback(message);
        }
        callbacks.len()
    }
}

/// Thread-safe in-process bus. Clones share the same topics.
#[derive(Clone, Default)]
pub struct LocalBus {
    registry: Arc<Registry>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus that also records every delivered value, readable through
    /// [`LocalBus::published`]. The record is never trimmed.
    pub fn with_history() -> Self {
        LocalBus {
            registry: Arc::new(Registry {
                history: Some(DashMap::new()),
                ..Registry::default()
            }),
        }
    }

    /// Deliver a message to every current subscriber of `topic`.
    /// Returns the number of callbacks invoked.
    pub fn deliver(&self, topic: &str, message: Float64) -> usize {
        self.registry.deliver(topic, message)
    }

    /// Decode a serialized sample and deliver it.
    ///
    /// A payload that does not decode is rejected here and never reaches a
    /// subscriber.
    pub fn inject(&self, topic: &str, payload: &str) -> Result<usize> {
        let message = Float64::decode(payload)?;
        Ok(self.deliver(topic, message))
    }

    /// Every value delivered on `topic` so far, in delivery order.
    /// Always empty unless the bus was built with [`LocalBus::with_history`].
    pub fn published(&self, topic: &str) -> Vec<f64> {
        self.registry
            .history
            .as_ref()
            .and_then(|history| history.get(topic).map(|values| values.value().clone()))
            .unwrap_or_default()
    }

    pub fn subscription_count(&self, topic: &str) -> usize {
        self.registry
            .subscriptions
            .get(topic)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    pub fn publisher_count(&self, topic: &str) -> usize {
        self.registry
            .publishers
            .get(topic)
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Total live subscriptions across all topics
    pub fn total_subscriptions(&self) -> usize {
        self.registry
            .subscriptions
            .iter()
            .map(|entry| entry.value().len())
            .sum()
    }

    /// Total live publishers across all topics
    pub fn total_publishers(&self) -> usize {
        self.registry
            .publishers
            .iter()
            .map(|entry| *entry.value())
            .sum()
    }
}

/// Publisher handle for a `LocalBus` topic
pub struct LocalPublisher {
    topic: String,
    registry: Weak<Registry>,
}

impl LocalPublisher {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl TopicPublisher for LocalPublisher {
    fn publish(&self, message: &Float64) -> Result<()> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| Error::bus(&self.topic, "bus has been dropped"))?;
        registry.deliver(&self.topic, *message);
        Ok(())
    }
}

impl Drop for LocalPublisher {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        registry.publishers.remove_if_mut(&self.topic, |_, count| {
            *count = count.saturating_sub(1);
            *count == 0
        });
    }
}

/// Subscription handle for a `LocalBus` topic; dropping it unsubscribes
pub struct LocalSubscription {
    topic: String,
    id: u64,
    registry: Weak<Registry>,
}

impl LocalSubscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for LocalSubscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        registry.subscriptions.remove_if_mut(&self.topic, |_, entry| {
            entry.retain(|(id, _)| *id != self.id);
            entry.is_empty()
        });
    }
}

impl MessageBus for LocalBus {
    type Publisher = LocalPublisher;
    type Subscription = LocalSubscription;

    fn create_publisher(&self, topic: &str) -> Result<Self::Publisher> {
        *self
            .registry
            .publishers
            .entry(topic.to_string())
            .or_insert(0) += 1;

        Ok(LocalPublisher {
            topic: topic.to_string(),
            registry: Arc::downgrade(&self.registry),
        })
    }

    fn create_subscription<F>(&self, topic: &str, callback: F) -> Result<Self::Subscription>
    where
        F: Fn(Float64) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback = Arc::new(callback);
        self.registry
            .subscriptions
            .entry(topic.to_string())
            .or_default()
            .push((id, callback));

        Ok(LocalSubscription {
            topic: topic.to_string(),
            id,
            registry: Arc::downgrade(&self.registry),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_deliver_reaches_only_matching_topic() {
        let bus = LocalBus::with_history();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _sub = bus
            .create_subscription("a", move |msg| sink.lock().unwrap().push(msg.data))
            .unwrap();

        assert_eq!(bus.deliver("a", Float64::new(1.0)), 1);
        assert_eq!(bus.deliver("b", Float64::new(2.0)), 0);
        assert_eq!(*seen.lock().unwrap(), vec![1.0]);
        assert_eq!(bus.published("b"), vec![2.0]);
    }

    #[test]
    fn test_dropping_handles_releases_them() {
        let bus = LocalBus::new();
        let publisher = bus.create_publisher("x/measured").unwrap();
        let second = bus.create_publisher("x/measured").unwrap();
        let sub = bus.create_subscription("x/raw", |_| {}).unwrap();
        assert_eq!(bus.publisher_count("x/measured"), 2);
        assert_eq!(bus.subscription_count("x/raw"), 1);

        drop(publisher);
        assert_eq!(bus.publisher_count("x/measured"), 1);
        drop(second);
        drop(sub);
        assert_eq!(bus.total_publishers(), 0);
        assert_eq!(bus.total_subscriptions(), 0);
    }

    #[test]
    fn test_publish_after_bus_dropped_fails() {
        let bus = LocalBus::new();
        let publisher = bus.create_publisher("t").unwrap();
        drop(bus);
        let err = publisher.publish(&Float64::new(1.0)).unwrap_err();
        assert!(matches!(err, Error::Bus { ref topic, .. } if topic == "t"));
    }

    #[test]
    fn test_inject_rejects_malformed_payload() {
        let bus = LocalBus::with_history();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus
            .create_subscription("t", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(matches!(bus.inject("t", "not a number"), Err(Error::Decode(_))));
        assert_eq!(bus.inject("t", r#"{"data": 4.0}"#).unwrap(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.published("t"), vec![4.0]);
    }

    #[test]
    fn test_callback_may_publish_reentrantly() {
        let bus = LocalBus::with_history();
        let publisher = bus.create_publisher("out").unwrap();
        let _sub = bus
            .create_subscription("in", move |msg| {
                publisher.publish(&Float64::new(msg.data * 2.0)).unwrap();
            })
            .unwrap();

        bus.deliver("in", Float64::new(3.0));
        assert_eq!(bus.published("out"), vec![6.0]);
    }

    #[test]
    fn test_history_recorded_only_when_enabled() {
        let plain = LocalBus::new();
        let recording = LocalBus::with_history();
        for value in [1.0, 2.0, 3.0] {
            plain.deliver("t", Float64::new(value));
            recording.deliver("t", Float64::new(value));
        }

        assert!(plain.published("t").is_empty());
        assert_eq!(recording.published("t"), vec![1.0, 2.0, 3.0]);
        assert!(recording.published("other").is_empty());
    }
}
