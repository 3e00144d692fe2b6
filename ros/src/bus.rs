//! `MessageBus` backed by an rclrs node

use rclrs::{Node, QOS_PROFILE_DEFAULT};
use std::sync::Arc;
use std_msgs::msg::Float64 as RosFloat64;
use topic_filter::{Error, Float64, MessageBus, Result, TopicPublisher};

/// Publishes and subscribes `std_msgs/msg/Float64` through one node.
///
/// Topic names are relative, so they resolve under the node namespace.
pub struct RosBus {
    node: Arc<Node>,
}

impl RosBus {
    pub fn new(node: Arc<Node>) -> Self {
        RosBus { node }
    }
}

pub struct RosPublisher {
    topic: String,
    publisher: Arc<rclrs::Publisher<RosFloat64>>,
}

impl TopicPublisher for RosPublisher {
    fn publish(&self, message: &Float64) -> Result<()> {
        let msg = RosFloat64 { data: message.data };
        self.publisher
            .publish(&msg)
            .map_err(|e| Error::bus(&self.topic, e))
    }
}

impl MessageBus for RosBus {
    type Publisher = RosPublisher;
    type Subscription = Arc<rclrs::Subscription<RosFloat64>>;

    fn create_publisher(&self, topic: &str) -> Result<Self::Publisher> {
        let publisher = self
            .node
            .create_publisher::<RosFloat64>(topic, QOS_PROFILE_DEFAULT)
            .map_err(|e| Error::bus(topic, e))?;

        Ok(RosPublisher {
            topic: topic.to_string(),
            publisher,
        })
    }

    fn create_subscription<F>(&self, topic: &str, callback: F) -> Result<Self::Subscription>
    where
        F: Fn(Float64) + Send + Sync + 'static,
    {
        self.node
            .create_subscription::<RosFloat64, _>(
                topic,
                QOS_PROFILE_DEFAULT,
                move |msg: RosFloat64| {
                    callback(Float64::new(msg.data));
                },
            )
            .map_err(|e| Error::bus(topic, e))
    }
}
