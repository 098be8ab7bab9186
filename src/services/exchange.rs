/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The exchange service: the receiving side of the peers' [meeting process](crate::meeting).
//!
//! ```ignore
//! let exchange =
//!     ExchangeService::builder()
//!     .context(context.clone())
//!     .on_meet(|event| exchange_with(&event.origin))
//!     .build()
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use typed_builder::TypedBuilder;

use crate::context::LocalContext;
use crate::error::RegistrationError;
use crate::events::{ExchangeEvent, HandlerPtr};
use crate::logging;
use crate::messages::{ExchangeMessage, Message};
use crate::services::{Service, ServiceKind};

#[derive(TypedBuilder)]
pub struct ExchangeService {
    #[builder(setter(doc = "Set the local context whose routing view the exchanges refer to. Required."))]
    context: Arc<LocalContext>,
    #[builder(default, setter(transform = |handler: impl Fn(&ExchangeEvent) + Send + Sync + 'static| Some(Box::new(handler) as HandlerPtr<ExchangeEvent>),
    doc = "Register a handler closure to be invoked after a peer meets this node. Optional."))]
    on_meet: Option<HandlerPtr<ExchangeEvent>>,
    #[builder(default, setter(skip))]
    meetings: AtomicU64,
}

impl ExchangeService {
    /// Number of meetings received since the service was created.
    pub fn meetings(&self) -> u64 {
        self.meetings.load(Ordering::Relaxed)
    }
}

impl Service for ExchangeService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Exchange
    }

    fn register(&self, context: &LocalContext) -> Result<(), RegistrationError> {
        if context.is_configured() && self.context.is_configured() {
            Ok(())
        } else {
            Err(RegistrationError::NotConfigured(ServiceKind::Exchange))
        }
    }

    fn handle(&self, sender: SocketAddr, message: Message) {
        let origin = match message {
            Message::Exchange(ExchangeMessage::Meet { origin }) => origin,
            other => {
                log::warn!("Exchange service received a {} message from {}", other.service_kind(), sender);
                return;
            }
        };

        let event = ExchangeEvent {
            timestamp: SystemTime::now(),
            origin,
        };
        logging::info::received_exchange(&event);
        self.meetings.fetch_add(1, Ordering::Relaxed);
        if let Some(handler) = &self.on_meet {
            handler(&event);
        }
    }
}
