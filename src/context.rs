/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Per-process holder of the local [RoutingView].
//!
//! The context is created empty, shared (behind an `Arc`) with every component that needs the view, and then
//! set exactly once by the [initialization orchestrator](crate::initialization). After that it is only ever
//! read, so readers on the listener and scheduler threads need no further synchronization.

use std::sync::OnceLock;

use crate::error::ContextError;
use crate::routing::RoutingView;
use crate::types::Host;

#[derive(Debug, Default)]
pub struct LocalContext {
    routing_view: OnceLock<RoutingView>,
}

impl LocalContext {
    pub fn new() -> LocalContext {
        Self::default()
    }

    /// Set the routing view. Fails, leaving the current view untouched, if a view has already been set.
    pub fn set_routing_view(&self, view: RoutingView) -> Result<(), ContextError> {
        self.routing_view
            .set(view)
            .map_err(|_| ContextError::AlreadySet)
    }

    pub fn routing_view(&self) -> Option<&RoutingView> {
        self.routing_view.get()
    }

    pub fn localhost(&self) -> Option<&Host> {
        self.routing_view().map(RoutingView::localhost)
    }

    pub fn is_configured(&self) -> bool {
        self.routing_view.get().is_some()
    }
}
