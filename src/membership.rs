/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The controller's map of every host in the network, keyed by host name.

use std::collections::{BTreeMap, HashSet};

use crate::error::MalformedReason;
use crate::types::Host;

/// Read-only after construction. Iteration is ordered by host name.
#[derive(Clone, Debug, Default)]
pub struct Membership {
    hosts: BTreeMap<String, Host>,
}

impl Membership {
    /// Build the map from a network description. Host names and identifiers must be unique.
    pub fn from_hosts(hosts: Vec<Host>) -> Result<Membership, MalformedReason> {
        let mut ids = HashSet::new();
        let mut map = BTreeMap::new();
        for host in hosts {
            if !ids.insert(host.id.clone()) {
                return Err(MalformedReason::DuplicateId(host.id));
            }
            if map.contains_key(host.name()) {
                return Err(MalformedReason::DuplicateName(host.address));
            }
            map.insert(host.name().to_owned(), host);
        }

        Ok(Membership { hosts: map })
    }

    pub fn get(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
