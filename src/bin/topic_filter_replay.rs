//! Replay recorded raw samples through the relay without a ROS graph.
//!
//! Reads `<variable> <payload>` lines from stdin, where the payload is either
//! a bare number or `{"data": <number>}`, and prints `<variable> <measured>`
//! for every smoothed value. Lines starting with `#` are ignored.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use topic_filter::lifecycle::{bring_up, shut_down};
use topic_filter::{measured_topic, raw_topic, FilterConfig, LocalBus, MessageBus, RelayManager};

fn replay_line(bus: &LocalBus, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    let Some((variable, payload)) = line.split_once(char::is_whitespace) else {
        tracing::warn!(line, "Expected `<variable> <payload>`, skipping");
        return;
    };

    match bus.inject(&raw_topic(variable), payload) {
        Ok(0) => tracing::debug!(variable, "No binding for variable, sample ignored"),
        Ok(_) => {}
        Err(e) => tracing::warn!(variable, payload, error = %e, "Skipping malformed sample"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    topic_filter::init_tracing();

    let config = FilterConfig::from_env().context("Failed to load configuration")?;
    let variables = config.resolve_variables();

    let bus = LocalBus::new();
    let mut relay = RelayManager::with_alpha(bus.clone(), variables.clone(), config.alpha)?;
    bring_up(&mut relay).context("Failed to start relay")?;

    let mut printers = Vec::with_capacity(variables.len());
    for variable in &variables {
        let name = variable.clone();
        let printer = bus.create_subscription(&measured_topic(variable), move |msg| {
            println!("{} {}", name, msg.data);
        })?;
        printers.push(printer);
    }

    tracing::info!(node = %config.node_name, bindings = relay.len(), "Replaying samples from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            result = signal::ctrl_c() => {
                result.context("Failed to listen for shutdown signal")?;
                tracing::info!("Shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => replay_line(&bus, &line),
                    None => break,
                }
            }
        }
    }

    drop(printers);
    shut_down(&mut relay).context("Failed to stop relay")?;
    Ok(())
}
