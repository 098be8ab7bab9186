/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The repair service: receives the controller's forced repair orders.
//!
//! A node receiving a [RepairMessage] is the initiator of the repair. The service resolves the request against
//! the local routing view before handing it on:
//! - a single-host repair targets the known host whose name matches the failed host's name;
//! - a subtree repair targets every known host under the path. Operators may write the path with separators
//!   (`/0/1`); separators are ignored when matching.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use typed_builder::TypedBuilder;

use crate::context::LocalContext;
use crate::error::RegistrationError;
use crate::events::{HandlerPtr, RepairEvent};
use crate::logging;
use crate::messages::{Message, RepairMessage};
use crate::services::{Service, ServiceKind};
use crate::types::{Host, HostPath};

#[derive(TypedBuilder)]
pub struct RepairService {
    #[builder(setter(doc = "Set the local context whose routing view repair requests are resolved against. Required."))]
    context: Arc<LocalContext>,
    #[builder(default, setter(transform = |handler: impl Fn(&RepairEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<RepairEvent>),
    doc = "Register a handler closure to be invoked after a repair order is received. Optional."))]
    on_repair: Option<HandlerPtr<RepairEvent>>,
}

impl RepairService {
    fn targets(&self, request: &RepairMessage) -> Vec<Host> {
        let Some(view) = self.context.routing_view() else {
            return Vec::new();
        };
        match request {
            RepairMessage::ForceSingleHost { failed } => view
                .hosts()
                .iter()
                .filter(|host| host.name() == failed)
                .cloned()
                .collect(),
            RepairMessage::ForceSubtree { path } => {
                let prefix = HostPath::new(path.replace('/', ""));
                view.subtree(&prefix).cloned().collect()
            }
        }
    }
}

impl Service for RepairService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Repair
    }

    fn register(&self, context: &LocalContext) -> Result<(), RegistrationError> {
        if context.is_configured() && self.context.is_configured() {
            Ok(())
        } else {
            Err(RegistrationError::NotConfigured(ServiceKind::Repair))
        }
    }

    fn handle(&self, sender: SocketAddr, message: Message) {
        let request = match message {
            Message::Repair(request) => request,
            other => {
                log::warn!("Repair service received a {} message from {}", other.service_kind(), sender);
                return;
            }
        };

        let event = RepairEvent {
            timestamp: SystemTime::now(),
            sender,
            targets: self.targets(&request),
            request,
        };
        logging::info::received_repair(&event);
        if let Some(handler) = &self.on_repair {
            handler(&event);
        }
    }
}
