/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](RoutingViewLoader) for loading a routing view from a file, and the JSON implementation
//! used by both binaries.
//!
//! Loading either produces a complete, validated value or an error; nothing partially built ever reaches the
//! caller. A path that cannot be read is a [LoadError::NotFound]; content that cannot be parsed or breaks the
//! invariants of [RoutingView] or [Membership] is a [LoadError::Malformed].

use std::fs;
use std::path::Path;

use crate::error::{LoadError, MalformedReason};
use crate::logging;
use crate::membership::Membership;
use crate::routing::{RoutingView, RoutingViewFile};
use crate::types::Host;

pub trait RoutingViewLoader {
    fn load(&self, path: &Path) -> Result<RoutingView, LoadError>;
}

/// Reads routing views and network membership files stored as JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFileLoader;

impl JsonFileLoader {
    /// Load the controller's network description: a JSON array of hosts.
    pub fn load_membership(&self, path: &Path) -> Result<Membership, LoadError> {
        let contents = read(path)?;
        let membership = serde_json::from_str::<Vec<Host>>(&contents)
            .map_err(MalformedReason::from)
            .and_then(Membership::from_hosts)
            .map_err(|reason| malformed(path, reason))?;
        logging::info::loaded_membership(path, membership.len());
        Ok(membership)
    }
}

impl RoutingViewLoader for JsonFileLoader {
    fn load(&self, path: &Path) -> Result<RoutingView, LoadError> {
        let contents = read(path)?;
        let view = serde_json::from_str::<RoutingViewFile>(&contents)
            .map_err(MalformedReason::from)
            .and_then(RoutingView::try_from)
            .map_err(|reason| malformed(path, reason))?;
        logging::info::loaded_routing_view(path, view.localhost(), view.len());
        Ok(view)
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::NotFound {
        path: path.to_path_buf(),
        source,
    })
}

fn malformed(path: &Path, reason: MalformedReason) -> LoadError {
    LoadError::Malformed {
        path: path.to_path_buf(),
        reason,
    }
}
