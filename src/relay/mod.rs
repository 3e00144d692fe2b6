//! Relay from `<variable>/raw` to `<variable>/measured`
//!
//! Every variable gets its own binding: one subscription on the raw topic,
//! one publisher on the measured topic and one exclusively owned [`Ewma`].
//! Bindings share no mutable state, so deliveries on different topics never
//! contend. Deliveries on the same topic are folded one at a time under the
//! binding's lock, and the measured value is published before the lock is
//! released so measured output keeps the order of the fold.

use crate::bus::{MessageBus, TopicPublisher};
use crate::common::types::{ChannelPair, Float64};
use crate::error::Result;
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::perception::filters::{Ewma, Filter, DEFAULT_ALPHA};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One live raw -> measured relay
pub struct Binding<B: MessageBus> {
    // Declared first so the callback is unregistered before the publisher closes.
    _subscription: B::Subscription,
    _publisher: Arc<B::Publisher>,
    channels: ChannelPair,
    filter: Arc<Mutex<Ewma>>,
}

impl<B: MessageBus> Binding<B> {
    pub fn variable(&self) -> &str {
        &self.channels.variable
    }

    pub fn channels(&self) -> &ChannelPair {
        &self.channels
    }

    /// Current smoothed value, `None` until the first raw sample arrives
    pub fn average(&self) -> Option<f64> {
        lock(&self.filter).average()
    }

    /// Number of raw samples folded into this binding's filter
    pub fn samples(&self) -> u64 {
        lock(&self.filter).samples()
    }
}

fn lock(filter: &Mutex<Ewma>) -> MutexGuard<'_, Ewma> {
    // The filter update cannot panic, so a poisoned lock still holds a valid average.
    filter.lock().unwrap_or_else(PoisonError::into_inner)
}

fn relay_handler<P>(
    topic: String,
    filter: Arc<Mutex<Ewma>>,
    publisher: Arc<P>,
) -> impl Fn(Float64) + Send + Sync + 'static
where
    P: TopicPublisher + 'static,
{
    move |sample: Float64| {
        let mut filter = lock(&filter);
        let average = filter.update(sample.data);

        match publisher.publish(&Float64::new(average)) {
            Ok(()) => tracing::trace!(topic = %topic, raw = sample.data, average, "Published measured value"),
            Err(e) => tracing::warn!(topic = %topic, error = %e, "Failed to publish measured value"),
        }
    }
}

/// Owns every relay binding for the lifetime of the process
pub struct RelayManager<B: MessageBus> {
    base: LifecycleNodeBase,
    bus: B,
    alpha: f64,
    variables: Vec<String>,
    bindings: Vec<Binding<B>>,
}

impl<B: MessageBus> RelayManager<B> {
    /// Create a relay for `variables` using [`DEFAULT_ALPHA`]
    pub fn new<I, S>(bus: B, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RelayManager {
            base: LifecycleNodeBase::new("topic_filter"),
            bus,
            alpha: DEFAULT_ALPHA,
            variables: variables.into_iter().map(Into::into).collect(),
            bindings: Vec::new(),
        }
    }

    /// Create a relay whose bindings all share `alpha`
    pub fn with_alpha<I, S>(bus: B, variables: I, alpha: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ewma::new(alpha)?;
        let mut relay = Self::new(bus, variables);
        relay.alpha = alpha;
        Ok(relay)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn state(&self) -> State {
        self.base.get_state()
    }

    /// Bind every identifier in `variables` and return the full active set.
    ///
    /// Identifiers that are already bound are skipped. If the bus refuses a
    /// publisher or subscription, nothing from this call stays installed.
    pub fn bind<I, S>(&mut self, variables: I) -> Result<&[Binding<B>]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pending: Vec<Binding<B>> = Vec::new();

        for variable in variables {
            let variable = variable.as_ref();
            if self.binding(variable).is_some() || pending.iter().any(|b| b.variable() == variable) {
                tracing::warn!(variable, "Variable is already bound, skipping");
                continue;
            }

            // Early return drops `pending`, releasing its handles.
            pending.push(self.bind_one(variable)?);
        }

        let installed = pending.len();
        self.bindings.extend(pending);
        tracing::info!(installed, total = self.bindings.len(), alpha = self.alpha, "Relay bindings installed");

        Ok(self.bindings.as_slice())
    }

    fn bind_one(&self, variable: &str) -> Result<Binding<B>> {
        let channels = ChannelPair::for_variable(variable);
        tracing::info!(src = %channels.raw, dest = %channels.measured, "Filtering topic");

        let filter = Arc::new(Mutex::new(Ewma::new(self.alpha)?));
        let publisher = Arc::new(self.bus.create_publisher(&channels.measured)?);
        let subscription = self.bus.create_subscription(
            &channels.raw,
            relay_handler(
                channels.measured.clone(),
                Arc::clone(&filter),
                Arc::clone(&publisher),
            ),
        )?;

        Ok(Binding {
            _subscription: subscription,
            _publisher: publisher,
            channels,
            filter,
        })
    }

    pub fn bindings(&self) -> &[Binding<B>] {
        &self.bindings
    }

    pub fn binding(&self, variable: &str) -> Option<&Binding<B>> {
        self.bindings.iter().find(|b| b.variable() == variable)
    }

    /// Current smoothed value for `variable`
    pub fn average(&self, variable: &str) -> Option<f64> {
        self.binding(variable).and_then(Binding::average)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Cancel every subscription and close every publisher
    pub fn teardown(&mut self) {
        let released = self.bindings.len();
        self.bindings.clear();
        tracing::info!(released, "Relay bindings released");
    }
}

/// Bindings are installed on configure and released on cleanup.
/// Activate and deactivate only move the state label: an `Inactive` relay
/// keeps folding and publishing every sample until it is cleaned up.
impl<B: MessageBus> LifecycleNode for RelayManager<B> {
    fn on_configure(&mut self) -> Result<()> {
        let variables = self.variables.clone();
        self.bind(&variables)?;
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_activate(&mut self) -> Result<()> {
        self.base.set_state(State::Active);
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<()> {
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_cleanup(&mut self) -> Result<()> {
        self.teardown();
        self.base.set_state(State::Unconfigured);
        Ok(())
    }
}
