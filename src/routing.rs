/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A node's local view of the grid: itself, plus the peers it knows about.
//!
//! A [RoutingView] can only be built through [RoutingView::new], which enforces the view's invariants:
//! 1. There is exactly one local host, and it is never repeated among the known hosts.
//! 2. Identifiers are unique across the view.
//! 3. No two hosts (the local host included) occupy the same path.
//! 4. Every path is made of binary digits only.
//!
//! Because of these invariants, lookups by identifier and by path never have more than one answer.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::MalformedReason;
use crate::types::{Host, HostId, HostPath};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingView {
    localhost: Host,
    hosts: Vec<Host>,
}

impl RoutingView {
    /// Build a view with `localhost` as its designated local host. `hosts` must not contain `localhost`.
    pub fn new(localhost: Host, hosts: Vec<Host>) -> Result<RoutingView, MalformedReason> {
        let mut ids = HashSet::new();
        let mut paths = HashSet::new();
        for host in std::iter::once(&localhost).chain(hosts.iter()) {
            if !host.path.is_binary() {
                return Err(MalformedReason::InvalidPath(host.path.clone()));
            }
            if !ids.insert(&host.id) {
                return Err(MalformedReason::DuplicateId(host.id.clone()));
            }
            if !paths.insert(&host.path) {
                return Err(MalformedReason::DuplicatePath(host.path.clone()));
            }
        }

        Ok(RoutingView { localhost, hosts })
    }

    pub fn localhost(&self) -> &Host {
        &self.localhost
    }

    /// The known hosts, excluding the local host.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// The local host followed by every known host.
    pub fn all_hosts(&self) -> impl Iterator<Item = &Host> {
        std::iter::once(&self.localhost).chain(self.hosts.iter())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn host_by_id(&self, id: &HostId) -> Option<&Host> {
        self.all_hosts().find(|host| &host.id == id)
    }

    pub fn host_by_path(&self, path: &HostPath) -> Option<&Host> {
        self.all_hosts().find(|host| &host.path == path)
    }

    /// Known hosts whose path starts with `prefix`, i.e., the hosts in the subtree rooted at `prefix`.
    pub fn subtree(&self, prefix: &HostPath) -> impl Iterator<Item = &Host> + '_ {
        let prefix = prefix.as_str().to_owned();
        self.hosts
            .iter()
            .filter(move |host| host.path.as_str().starts_with(&prefix))
    }
}

/// On-disk shape of a routing view. Converted into a [RoutingView] through [TryFrom], which validates it.
#[derive(Deserialize)]
pub(crate) struct RoutingViewFile {
    pub(crate) localhost: Host,
    #[serde(default)]
    pub(crate) hosts: Vec<Host>,
}

impl TryFrom<RoutingViewFile> for RoutingView {
    type Error = MalformedReason;

    fn try_from(file: RoutingViewFile) -> Result<Self, Self::Error> {
        RoutingView::new(file.localhost, file.hosts)
    }
}
