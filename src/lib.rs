/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Bootstrap and control plane for nodes of a tree-structured grid overlay.
//!
//! A grid is made up of peers and one controller. Every node reads a local routing view from a JSON file,
//! registers its [services](services) with the [initialization orchestrator](initialization), and starts a
//! [listener](networking::Listener) for them. From there:
//! - Peers run a [meeting process](meeting) that periodically contacts a random known host.
//! - The controller reads operator commands from a [command loop](dispatcher) and turns them into
//!   [actions](control) on the hosts of its membership map: killing hosts and forcing repairs.
//!
//! The two binaries, `grid-controller` and `grid-peer`, wire these together over TCP.

pub mod config;

pub mod context;

pub mod control;

pub mod dispatcher;

pub mod error;

pub mod events;

pub mod initialization;

pub mod logging;

pub mod meeting;

pub mod membership;

pub mod messages;

pub mod networking;

pub mod persistence;

pub mod routing;

pub mod services;

pub mod types;
