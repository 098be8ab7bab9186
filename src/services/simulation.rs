/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The simulation service: lets the controller terminate nodes to simulate failures.
//!
//! The service itself never exits the process. The peer binary registers an `on_kill` handler that does.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use typed_builder::TypedBuilder;

use crate::events::{HandlerPtr, KillEvent};
use crate::logging;
use crate::messages::{Message, SimulationMessage};
use crate::services::{Service, ServiceKind};

#[derive(TypedBuilder)]
pub struct SimulationService {
    #[builder(default, setter(transform = |handler: impl Fn(&KillEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<KillEvent>),
    doc = "Register a handler closure to be invoked after a kill order is received. Optional."))]
    on_kill: Option<HandlerPtr<KillEvent>>,
    #[builder(default, setter(skip))]
    killed: AtomicBool,
}

impl SimulationService {
    /// Whether a kill order has been received.
    pub fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

impl Service for SimulationService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Simulation
    }

    fn handle(&self, sender: SocketAddr, message: Message) {
        match message {
            Message::Simulation(SimulationMessage::Kill) => {
                let event = KillEvent {
                    timestamp: SystemTime::now(),
                    sender,
                };
                logging::info::received_kill(&event);
                self.killed.store(true, Ordering::SeqCst);
                if let Some(handler) = &self.on_kill {
                    handler(&event);
                }
            }
            other => {
                log::warn!("Simulation service received a {} message from {}", other.service_kind(), sender)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn kill_reaches_handler_once_per_order() {
        let kills = Arc::new(AtomicUsize::new(0));
        let counted = kills.clone();
        let service = SimulationService::builder()
            .on_kill(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        assert!(!service.killed());
        service.handle("127.0.0.1:4000".parse().unwrap(), SimulationMessage::Kill.into());
        assert!(service.killed());
        assert_eq!(kills.load(Ordering::SeqCst), 1);
    }
}
