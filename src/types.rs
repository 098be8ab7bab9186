/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Inert types describing the participants of the grid.
//!
//! These types are sent around and inspected, but have no active behavior. Identifier-like types follow
//! the newtype pattern so that a host's identifier cannot be mistaken for its path or its address.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Stable identifier of a host. Unique across the whole network.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Position of a host in the overlay's prefix tree, written as a string of binary digits. The empty path is
/// the root of the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(transparent)]
pub struct HostPath(String);

impl HostPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether every character of the path is a `0` or a `1`.
    pub fn is_binary(&self) -> bool {
        self.0.chars().all(|c| c == '0' || c == '1')
    }
}

impl Display for HostPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A single addressable participant of the grid.
///
/// The `address` doubles as the host's name: the controller's membership map and its commands refer to hosts
/// by address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Host {
    pub address: String,
    pub port: u16,
    pub id: HostId,
    pub path: HostPath,
}

impl Host {
    pub fn new(address: impl Into<String>, port: u16, id: HostId, path: HostPath) -> Self {
        Self {
            address: address.into(),
            port,
            id,
            path,
        }
    }

    /// The name operators use to refer to this host.
    pub fn name(&self) -> &str {
        &self.address
    }

    /// Resolve `address:port` to the first matching socket address.
    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        (self.address.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} resolved to no addresses", self.address),
                )
            })
    }
}

impl Display for Host {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}:{} - '{}'", self.path, self.address, self.port, self.id)
    }
}
