/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out node events.
//!
//! gridnode logs using the [log](https://docs.rs/log/latest/log/) crate. The binaries install a
//! [fern](https://docs.rs/fern/latest/fern/) backend through [setup_logger]; library users may install any other
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Event log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the event in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet is how a
//! received meeting is printed:
//!
//! ```text
//! ReceiveExchange, 1701329264, node-3.grid, 0110
//! ```
//!
//! In the snippet, the third value is the name of the peer that initiated the meeting, and the fourth value is
//! its path.

use std::io;
use std::sync::Once;
use std::thread;
use std::time::SystemTime;

use log::LevelFilter;

// Names of each event in PascalCase for printing:
pub const LOAD_ROUTING_VIEW: &str = "LoadRoutingView";
pub const LOAD_MEMBERSHIP: &str = "LoadMembership";
pub const REGISTER_SERVICE: &str = "RegisterService";
pub const START_LISTENER: &str = "StartListener";
pub const START_MEETINGS: &str = "StartMeetings";

pub const RECEIVE_EXCHANGE: &str = "ReceiveExchange";
pub const RECEIVE_REPAIR: &str = "ReceiveRepair";
pub const RECEIVE_KILL: &str = "ReceiveKill";

pub const MEET: &str = "Meet";
pub const SEND_COMMAND: &str = "SendCommand";

static LOGGER_INIT: Once = Once::new();

/// Set up a logger that prints every message with level `level` and above to stdout. Only the first call in a
/// process has an effect.
pub fn setup_logger(level: LevelFilter) {
    LOGGER_INIT.call_once(|| {
        let result = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{:?}][{}] {}",
                    thread::current().id(),
                    record.level(),
                    message
                ))
            })
            .level(level)
            .chain(io::stdout())
            .apply();
        if let Err(err) = result {
            eprintln!("a logger is already installed: {}", err);
        }
    })
}

pub(crate) fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

pub(crate) mod info {
    use std::net::SocketAddr;
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::events::{ExchangeEvent, KillEvent, RepairEvent};
    use crate::messages::RepairMessage;
    use crate::services::ServiceKind;
    use crate::types::Host;

    pub(crate) fn loaded_routing_view(path: &Path, localhost: &Host, known_hosts: usize) {
        log::info!(
            "{}, {}, {}, {}, {}",
            LOAD_ROUTING_VIEW,
            secs_since_unix_epoch(SystemTime::now()),
            path.display(),
            localhost.name(),
            known_hosts
        )
    }

    pub(crate) fn loaded_membership(path: &Path, hosts: usize) {
        log::info!(
            "{}, {}, {}, {}",
            LOAD_MEMBERSHIP,
            secs_since_unix_epoch(SystemTime::now()),
            path.display(),
            hosts
        )
    }

    pub(crate) fn registered_service(kind: ServiceKind) {
        log::info!(
            "{}, {}, {}",
            REGISTER_SERVICE,
            secs_since_unix_epoch(SystemTime::now()),
            kind
        )
    }

    pub(crate) fn started_listener(addr: SocketAddr) {
        log::info!(
            "{}, {}, {}",
            START_LISTENER,
            secs_since_unix_epoch(SystemTime::now()),
            addr
        )
    }

    pub(crate) fn started_meetings(initial_delay: Duration, period: Duration) {
        log::info!(
            "{}, {}, {}, {}",
            START_MEETINGS,
            secs_since_unix_epoch(SystemTime::now()),
            initial_delay.as_millis(),
            period.as_millis()
        )
    }

    pub(crate) fn received_exchange(event: &ExchangeEvent) {
        log::info!(
            "{}, {}, {}, {}",
            RECEIVE_EXCHANGE,
            secs_since_unix_epoch(event.timestamp),
            event.origin.name(),
            event.origin.path
        )
    }

    pub(crate) fn received_repair(event: &RepairEvent) {
        let (mode, target) = match &event.request {
            RepairMessage::ForceSingleHost { failed } => ("host", failed),
            RepairMessage::ForceSubtree { path } => ("subtree", path),
        };
        log::info!(
            "{}, {}, {}, {}, {}, {}",
            RECEIVE_REPAIR,
            secs_since_unix_epoch(event.timestamp),
            event.sender,
            mode,
            target,
            event.targets.len()
        )
    }

    pub(crate) fn received_kill(event: &KillEvent) {
        log::info!(
            "{}, {}, {}",
            RECEIVE_KILL,
            secs_since_unix_epoch(event.timestamp),
            event.sender
        )
    }
}

pub(crate) mod debug {
    use std::time::SystemTime;

    use super::*;
    use crate::services::ServiceKind;
    use crate::types::Host;

    pub(crate) fn known_host(host: &Host) {
        log::debug!("{}", host)
    }

    pub(crate) fn met(peer: &Host) {
        log::debug!(
            "{}, {}, {}, {}",
            MEET,
            secs_since_unix_epoch(SystemTime::now()),
            peer.name(),
            peer.path
        )
    }

    pub(crate) fn sent_command(kind: ServiceKind, target: &Host) {
        log::debug!(
            "{}, {}, {}, {}:{}",
            SEND_COMMAND,
            secs_since_unix_epoch(SystemTime::now()),
            kind,
            target.address,
            target.port
        )
    }
}
