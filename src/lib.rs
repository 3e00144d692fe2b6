//! Smoothing relay for environment sensor topics
//!
//! For every environmental variable `V` the relay subscribes to `V/raw`,
//! passes each sample through its own exponentially weighted moving average
//! and republishes the result on `V/measured`.
//!
//! - [`perception::filters`]: the EWMA filter
//! - [`relay`]: one binding per variable, owned by [`RelayManager`]
//! - [`bus`]: the publish/subscribe capability the relay consumes, plus an
//!   in-process implementation
//! - [`catalog`]: known variables and their groups
//! - [`config`]: environment driven settings

pub mod bus;
pub mod catalog;
pub mod common;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod perception;
pub mod relay;

pub use bus::{LocalBus, MessageBus, TopicPublisher};
pub use common::types::{measured_topic, raw_topic, ChannelPair, Float64};
pub use config::FilterConfig;
pub use error::{Error, Result};
pub use perception::filters::{Ewma, Filter, DEFAULT_ALPHA};
pub use relay::{Binding, RelayManager};

/// Initialize tracing subscriber for structured logging
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topic_filter=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
