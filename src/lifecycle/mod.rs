//! Lifecycle management for relay components

use crate::error::Result;

/// Trait for components that follow a lifecycle pattern
pub trait LifecycleNode {
    /// Acquire resources (publishers, subscriptions)
    fn on_configure(&mut self) -> Result<()>;

    /// Activate the node
    fn on_activate(&mut self) -> Result<()>;

    /// Deactivate the node
    fn on_deactivate(&mut self) -> Result<()>;

    /// Release everything acquired in `on_configure`
    fn on_cleanup(&mut self) -> Result<()>;
}

/// Base implementation for lifecycle nodes
#[derive(Debug)]
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

/// State of a lifecycle node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
}

impl LifecycleNodeBase {
    /// Create a new lifecycle node base
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    /// Get the current state
    pub fn get_state(&self) -> State {
        self.state
    }

    /// Set the state
    pub fn set_state(&mut self, state: State) {
        tracing::debug!(node = %self.name, from = ?self.state, to = ?state, "Lifecycle transition");
        self.state = state;
    }
}

/// Run configure then activate
pub fn bring_up<N: LifecycleNode + ?Sized>(node: &mut N) -> Result<()> {
    node.on_configure()?;
    node.on_activate()
}

/// Run deactivate then cleanup
pub fn shut_down<N: LifecycleNode + ?Sized>(node: &mut N) -> Result<()> {
    node.on_deactivate()?;
    node.on_cleanup()
}
