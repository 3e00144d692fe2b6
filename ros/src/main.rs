mod bus;

use anyhow::{Context as _, Error, Result};
use rclrs::{Context, CreateBasicExecutor, RclrsErrorFilter, SpinOptions};
use topic_filter::lifecycle::{bring_up, shut_down};
use topic_filter::{FilterConfig, RelayManager};

use crate::bus::RosBus;

fn main() -> Result<(), Error> {
    topic_filter::init_tracing();

    let config = FilterConfig::from_env().context("Failed to load configuration")?;
    let variables = config.resolve_variables();

    // Launch under the environment namespace; every topic below is relative to it.
    let mut executor = Context::default_from_env()?.create_basic_executor();
    let node = executor.create_node(config.node_name.as_str())?;

    let mut relay = RelayManager::with_alpha(RosBus::new(node), variables, config.alpha)?;
    bring_up(&mut relay).context("Failed to install relay bindings")?;

    tracing::info!(
        node = %config.node_name,
        bindings = relay.len(),
        alpha = relay.alpha(),
        "Topic filter initialized. Starting to spin..."
    );

    let spun: Result<(), Error> = executor
        .spin(SpinOptions::default())
        .first_error()
        .map_err(|err| err.into());

    shut_down(&mut relay).context("Failed to release relay bindings")?;
    spun
}
