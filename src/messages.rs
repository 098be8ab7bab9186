/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions for structured messages that are sent between nodes.
//!
//! Every message belongs to exactly one [service kind](ServiceKind): [exchange](ExchangeMessage) messages are
//! sent by peers to each other during meetings, while [repair](RepairMessage) and [simulation](SimulationMessage)
//! messages are sent by the controller to drive the experiment.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::services::ServiceKind;
use crate::types::Host;

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Message {
    Exchange(ExchangeMessage),
    Repair(RepairMessage),
    Simulation(SimulationMessage),
}

impl Message {
    /// The kind of service that handles this message.
    pub fn service_kind(&self) -> ServiceKind {
        match self {
            Message::Exchange(_) => ServiceKind::Exchange,
            Message::Repair(_) => ServiceKind::Repair,
            Message::Simulation(_) => ServiceKind::Simulation,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ExchangeMessage {
    /// Sent by a peer's meeting process to a randomly chosen known host.
    Meet { origin: Host },
}

/// Orders to repair part of the grid. Sent by the controller to the host that should initiate the repair.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum RepairMessage {
    /// Repair a single failed host, named as in the controller's membership map.
    ForceSingleHost { failed: String },
    /// Repair every host under a subtree path. The path is forwarded exactly as the operator typed it.
    ForceSubtree { path: String },
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum SimulationMessage {
    /// Terminate the receiving node.
    Kill,
}

impl From<ExchangeMessage> for Message {
    fn from(message: ExchangeMessage) -> Self {
        Message::Exchange(message)
    }
}

impl From<RepairMessage> for Message {
    fn from(message: RepairMessage) -> Self {
        Message::Repair(message)
    }
}

impl From<SimulationMessage> for Message {
    fn from(message: SimulationMessage) -> Self {
        Message::Simulation(message)
    }
}
