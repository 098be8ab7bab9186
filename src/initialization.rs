/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The startup sequence shared by controllers and peers.
//!
//! An [Initializer] walks through the following states, in order, and never skips one:
//!
//! ```text
//! Created -> Configured -> ServicesRegistering -> ServicesRegistered -> ListenerStarted
//! ```
//!
//! 1. [configure](Initializer::configure) sets the local context's routing view.
//! 2. [register_services](Initializer::register_services) registers exchange, repair, and simulation, in that
//!    order. The first failure aborts registration. Services registered before the failure stay registered:
//!    there is no rollback.
//! 3. [start_listener](Initializer::start_listener) hands the registry to the [Listener], which makes the node
//!    reachable.
//!
//! Calling a step out of order is a programming error and panics. [bootstrap] runs all three steps and turns
//! their failures into a [StartupError].
//!
//! ## Starting a node
//!
//! ```ignore
//! let context = Arc::new(LocalContext::new());
//! let services = ServiceSet {
//!     exchange: Arc::new(ExchangeService::builder().context(context.clone()).build()),
//!     repair: Arc::new(RepairService::builder().context(context.clone()).build()),
//!     simulation: Arc::new(SimulationService::builder().build()),
//! };
//! let listener = bootstrap(context, view, services, TcpListenerService::new(&config))?;
//! ```

use std::mem;
use std::sync::Arc;

use crate::context::LocalContext;
use crate::error::{ContextError, RegistrationError, StartupError};
use crate::logging;
use crate::networking::Listener;
use crate::routing::RoutingView;
use crate::services::{ServiceRegistry, ServiceSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitState {
    Created,
    Configured,
    ServicesRegistering,
    ServicesRegistered,
    ListenerStarted,
}

pub struct Initializer<L: Listener> {
    state: InitState,
    history: Vec<InitState>,
    context: Arc<LocalContext>,
    registry: ServiceRegistry,
    listener: L,
}

impl<L: Listener> Initializer<L> {
    pub fn new(context: Arc<LocalContext>, listener: L) -> Initializer<L> {
        Initializer {
            state: InitState::Created,
            history: vec![InitState::Created],
            context,
            registry: ServiceRegistry::new(),
            listener,
        }
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// Every state entered so far, oldest first.
    pub fn history(&self) -> &[InitState] {
        &self.history
    }

    pub fn context(&self) -> &Arc<LocalContext> {
        &self.context
    }

    /// `Created -> Configured`.
    ///
    /// # Panics
    ///
    /// If the initializer is not in [InitState::Created].
    pub fn configure(&mut self, view: RoutingView) -> Result<(), ContextError> {
        self.expect_state(InitState::Created, "configure");
        self.context.set_routing_view(view)?;
        self.enter(InitState::Configured);
        Ok(())
    }

    /// `Configured -> ServicesRegistering -> ServicesRegistered`.
    ///
    /// On failure the initializer stays in [InitState::ServicesRegistering] and the services registered before
    /// the failing one remain registered.
    ///
    /// # Panics
    ///
    /// If the initializer is not in [InitState::Configured].
    pub fn register_services(&mut self, services: ServiceSet) -> Result<(), RegistrationError> {
        self.expect_state(InitState::Configured, "register services");
        self.enter(InitState::ServicesRegistering);
        for registration in services.registrations() {
            let kind = registration.kind;
            self.registry.register(registration, &self.context)?;
            logging::info::registered_service(kind);
        }
        self.enter(InitState::ServicesRegistered);
        Ok(())
    }

    /// `ServicesRegistered -> ListenerStarted`.
    ///
    /// If the listener fails to start, the initializer stays in [InitState::ServicesRegistered] but its registry
    /// has been handed over and is gone; the node cannot be started again.
    ///
    /// # Panics
    ///
    /// If the initializer is not in [InitState::ServicesRegistered].
    pub fn start_listener(&mut self) -> std::io::Result<L::Handle> {
        self.expect_state(InitState::ServicesRegistered, "start the listener");
        let localhost = self
            .context
            .localhost()
            .cloned()
            .expect("a configured context has a local host");
        let registry = Arc::new(mem::take(&mut self.registry));
        let handle = self.listener.start(&localhost, registry)?;
        self.enter(InitState::ListenerStarted);
        Ok(handle)
    }

    fn expect_state(&self, expected: InitState, step: &str) {
        assert!(
            self.state == expected,
            "cannot {} in state {:?}, expected {:?}",
            step,
            self.state,
            expected
        );
    }

    fn enter(&mut self, state: InitState) {
        self.state = state;
        self.history.push(state);
    }
}

/// Configure `context` with `view`, register `services`, and start `listener`.
pub fn bootstrap<L: Listener>(
    context: Arc<LocalContext>,
    view: RoutingView,
    services: ServiceSet,
    listener: L,
) -> Result<L::Handle, StartupError> {
    let mut initializer = Initializer::new(context, listener);
    initializer.configure(view)?;
    initializer.register_services(services)?;

    if let Some(view) = initializer.context().routing_view() {
        logging::debug::known_host(view.localhost());
        view.hosts().iter().for_each(logging::debug::known_host);
    }

    initializer
        .start_listener()
        .map_err(StartupError::Listener)
}
