/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](Control) for the actions an operator can take through the controller, and the
//! [Controller] that performs them over a [Transport].

use std::io::{self, Write};
use std::sync::Arc;

use crate::context::LocalContext;
use crate::error::ControlError;
use crate::membership::Membership;
use crate::messages::{Message, RepairMessage, SimulationMessage};
use crate::networking::Transport;

/// The actions behind the controller's commands.
///
/// The [command loop](crate::dispatcher::run) does not look host names up before calling these, so
/// implementations receive names that may be unknown.
pub trait Control {
    /// Stop the controller's own services.
    fn exit(&mut self);

    /// Write the controller's status to `out`.
    fn info(&self, out: &mut dyn Write) -> io::Result<()>;

    fn kill_host(&mut self, name: &str) -> Result<(), ControlError>;

    /// Order `initiator` to repair the overlay around the failed host `failed`.
    fn force_repair_single_host(&mut self, initiator: &str, failed: &str) -> Result<(), ControlError>;

    /// Order `initiator` to repair every host under `path`.
    fn force_repair_subtree(&mut self, initiator: &str, path: &str) -> Result<(), ControlError>;
}

pub struct Controller<T: Transport> {
    context: Arc<LocalContext>,
    membership: Membership,
    transport: T,
    shutdown: Option<Box<dyn FnOnce() + Send>>,
}

impl<T: Transport> Controller<T> {
    /// `shutdown` runs on the first call to [exit](Control::exit) and never again.
    pub fn new(
        context: Arc<LocalContext>,
        membership: Membership,
        transport: T,
        shutdown: impl FnOnce() + Send + 'static,
    ) -> Controller<T> {
        Controller {
            context,
            membership,
            transport,
            shutdown: Some(Box::new(shutdown)),
        }
    }

    /// Write the line operators see when the controller starts: the address it listens on.
    pub fn announce(&self, out: &mut dyn Write) -> io::Result<()> {
        match self.context.localhost() {
            Some(localhost) => writeln!(out, "Controller runs on {}:{}", localhost.address, localhost.port),
            None => Ok(()),
        }
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send_to(&self, name: &str, message: Message) -> Result<(), ControlError> {
        let host = self
            .membership
            .get(name)
            .ok_or_else(|| ControlError::UnknownHost(name.to_string()))?;
        self.transport
            .send(host, &message)
            .map_err(|source| ControlError::Transport {
                host: name.to_string(),
                source,
            })
    }
}

impl<T: Transport> Control for Controller<T> {
    fn exit(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown();
        }
    }

    fn info(&self, out: &mut dyn Write) -> io::Result<()> {
        self.announce(out)?;
        writeln!(out, "Network hosts ({}):", self.membership.len())?;
        for host in self.membership.iter() {
            writeln!(out, "{}", host)?;
        }
        Ok(())
    }

    fn kill_host(&mut self, name: &str) -> Result<(), ControlError> {
        self.send_to(name, SimulationMessage::Kill.into())
    }

    fn force_repair_single_host(&mut self, initiator: &str, failed: &str) -> Result<(), ControlError> {
        let request = RepairMessage::ForceSingleHost {
            failed: failed.to_string(),
        };
        self.send_to(initiator, request.into())
    }

    fn force_repair_subtree(&mut self, initiator: &str, path: &str) -> Result<(), ControlError> {
        let request = RepairMessage::ForceSubtree {
            path: path.to_string(),
        };
        self.send_to(initiator, request.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;
    use crate::routing::RoutingView;
    use crate::types::{Host, HostId, HostPath};

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<(String, Message)>>,
        refuse: bool,
    }

    impl Transport for Recording {
        fn send(&self, target: &Host, message: &Message) -> Result<(), TransportError> {
            if self.refuse {
                return Err(io::Error::from(io::ErrorKind::ConnectionRefused).into());
            }
            self.sent
                .lock()
                .unwrap()
                .push((target.name().to_string(), message.clone()));
            Ok(())
        }
    }

    fn host(name: &str, port: u16, id: &str, path: &str) -> Host {
        Host::new(name, port, HostId::new(id), HostPath::new(path))
    }

    fn controller(transport: Recording, shutdowns: Arc<AtomicUsize>) -> Controller<Recording> {
        let context = Arc::new(LocalContext::new());
        let view = RoutingView::new(host("controller", 4000, "ctl", ""), vec![]).unwrap();
        context.set_routing_view(view).unwrap();
        let membership = Membership::from_hosts(vec![
            host("node-1", 3001, "b", "1"),
            host("node-0", 3000, "a", "0"),
        ])
        .unwrap();
        Controller::new(context, membership, transport, move || {
            shutdowns.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn exit_runs_shutdown_once() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let mut controller = controller(Recording::default(), shutdowns.clone());
        controller.exit();
        controller.exit();
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn info_lists_membership_sorted_by_name() {
        let controller = controller(Recording::default(), Arc::new(AtomicUsize::new(0)));
        let mut out = Vec::new();
        controller.info(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Controller runs on controller:4000");
        assert_eq!(lines[2], "[0] node-0:3000 - 'a'");
        assert_eq!(lines[3], "[1] node-1:3001 - 'b'");
    }

    #[test]
    fn announcement_is_the_first_line_of_info() {
        let controller = controller(Recording::default(), Arc::new(AtomicUsize::new(0)));
        let mut announcement = Vec::new();
        controller.announce(&mut announcement).unwrap();
        assert_eq!(announcement, b"Controller runs on controller:4000\n");

        let mut info = Vec::new();
        controller.info(&mut info).unwrap();
        assert!(info.starts_with(&announcement));
    }

    #[test]
    fn repair_is_sent_to_initiator() {
        let mut controller = controller(Recording::default(), Arc::new(AtomicUsize::new(0)));
        controller.force_repair_single_host("node-0", "node-1").unwrap();
        controller.force_repair_subtree("node-1", "/0/1").unwrap();

        let sent = controller.transport().sent.lock().unwrap();
        assert_eq!(
            sent[0],
            (
                "node-0".to_string(),
                Message::from(RepairMessage::ForceSingleHost { failed: "node-1".into() })
            )
        );
        assert_eq!(
            sent[1],
            (
                "node-1".to_string(),
                Message::from(RepairMessage::ForceSubtree { path: "/0/1".into() })
            )
        );
    }

    #[test]
    fn unknown_host_is_an_error() {
        let mut controller = controller(Recording::default(), Arc::new(AtomicUsize::new(0)));
        assert!(matches!(
            controller.kill_host("node-7"),
            Err(ControlError::UnknownHost(name)) if name == "node-7"
        ));
        assert!(controller.transport().sent.lock().unwrap().is_empty());
    }

    #[test]
    fn transport_failure_names_the_host() {
        let transport = Recording {
            refuse: true,
            ..Default::default()
        };
        let mut controller = controller(transport, Arc::new(AtomicUsize::new(0)));
        assert!(matches!(
            controller.kill_host("node-1"),
            Err(ControlError::Transport { host, .. }) if host == "node-1"
        ));
    }
}
