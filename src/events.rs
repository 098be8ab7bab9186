//! Definitions of the events handed to service handlers.
//! Note: an event for a given message indicates that the message has been received and decoded.

use std::net::SocketAddr;
use std::time::SystemTime;

use crate::messages::RepairMessage;
use crate::types::Host;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A peer met this node.
pub struct ExchangeEvent {
    pub timestamp: SystemTime,
    pub origin: Host,
}

/// The controller ordered this node to initiate a repair.
pub struct RepairEvent {
    pub timestamp: SystemTime,
    pub sender: SocketAddr,
    pub request: RepairMessage,
    /// Hosts of the local routing view that the request refers to. Empty if the view knows none of them.
    pub targets: Vec<Host>,
}

/// The controller ordered this node to terminate.
pub struct KillEvent {
    pub timestamp: SystemTime,
    pub sender: SocketAddr,
}
