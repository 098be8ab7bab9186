/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](Service) for the services every node registers, and the types used to hand them to the
//! [initialization orchestrator](crate::initialization).
//!
//! Every node, controller or peer, runs exactly three services: [exchange](ServiceKind::Exchange),
//! [repair](ServiceKind::Repair), and [simulation](ServiceKind::Simulation). The services are composed
//! explicitly: the startup routine constructs one service per kind, puts them in a [ServiceSet], and the
//! orchestrator registers them, in that order, into a [ServiceRegistry] keyed by [ServiceKind]. The
//! [listener](crate::networking::Listener) then routes every inbound [Message] to the registered service of its
//! kind.
//!
//! This module also contains the default implementations of the three services. These decode requests, resolve
//! them against the local routing view, log them, and hand them to user-provided handler closures; the overlay
//! algorithms themselves live behind those closures.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::context::LocalContext;
use crate::error::RegistrationError;
use crate::messages::Message;

pub mod exchange;
pub mod repair;
pub mod simulation;

pub use exchange::ExchangeService;
pub use repair::RepairService;
pub use simulation::SimulationService;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    Exchange,
    Repair,
    Simulation,
}

impl ServiceKind {
    /// Every kind, in registration order.
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Exchange, ServiceKind::Repair, ServiceKind::Simulation];
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceKind::Exchange => "exchange",
            ServiceKind::Repair => "repair",
            ServiceKind::Simulation => "simulation",
        };
        f.write_str(name)
    }
}

/// A service reachable through the node's listener.
///
/// `handle` is called from the listener thread, one message at a time.
pub trait Service: Send + Sync {
    fn kind(&self) -> ServiceKind;

    /// Called once by the orchestrator when the service is registered. The local context has been configured
    /// by then; services that need the routing view may check for it here.
    fn register(&self, context: &LocalContext) -> Result<(), RegistrationError> {
        let _ = context;
        Ok(())
    }

    fn handle(&self, sender: SocketAddr, message: Message);
}

/// One service, tagged with the kind of slot it was handed over in.
#[derive(Clone)]
pub struct ServiceRegistration {
    pub kind: ServiceKind,
    pub service: Arc<dyn Service>,
}

/// Exactly one service per kind.
#[derive(Clone)]
pub struct ServiceSet {
    pub exchange: Arc<dyn Service>,
    pub repair: Arc<dyn Service>,
    pub simulation: Arc<dyn Service>,
}

impl ServiceSet {
    /// The registrations in the order they must be attempted: exchange, repair, simulation.
    pub fn registrations(self) -> [ServiceRegistration; 3] {
        [
            ServiceRegistration {
                kind: ServiceKind::Exchange,
                service: self.exchange,
            },
            ServiceRegistration {
                kind: ServiceKind::Repair,
                service: self.repair,
            },
            ServiceRegistration {
                kind: ServiceKind::Simulation,
                service: self.simulation,
            },
        ]
    }
}

/// Registered services, keyed by kind.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceKind, Arc<dyn Service>>,
}

impl ServiceRegistry {
    pub fn new() -> ServiceRegistry {
        Self::default()
    }

    /// Register the service of one registration entry. The entry is rejected if the service is of a different
    /// kind than its slot, if its own registration hook fails, or if its kind is already taken.
    pub fn register(
        &mut self,
        registration: ServiceRegistration,
        context: &LocalContext,
    ) -> Result<(), RegistrationError> {
        let ServiceRegistration { kind, service } = registration;
        if service.kind() != kind {
            return Err(RegistrationError::KindMismatch {
                expected: kind,
                actual: service.kind(),
            });
        }
        if self.services.contains_key(&kind) {
            return Err(RegistrationError::AlreadyRegistered(kind));
        }
        service.register(context)?;
        self.services.insert(kind, service);
        Ok(())
    }

    pub fn is_registered(&self, kind: ServiceKind) -> bool {
        self.services.contains_key(&kind)
    }

    /// Whether all three kinds are registered.
    pub fn is_complete(&self) -> bool {
        ServiceKind::ALL.iter().all(|kind| self.is_registered(*kind))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Route `message` to the registered service of its kind. Returns false if no such service is registered.
    pub fn dispatch(&self, sender: SocketAddr, message: Message) -> bool {
        match self.services.get(&message.service_kind()) {
            Some(service) => {
                service.handle(sender, message);
                true
            }
            None => {
                log::warn!(
                    "Dropping {} message from {}: no service registered",
                    message.service_kind(),
                    sender
                );
                false
            }
        }
    }
}
