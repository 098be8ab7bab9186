/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tests of the controller's command loop, driven by scripted operator input.
//!
//! Most tests run the loop against a [CallLog], which records the calls the loop makes without acting on them.
//! [commands_reach_hosts_through_controller] runs it against a real [Controller] whose transport is a
//! [TransportStub](common::transport::TransportStub). [exit_returns_after_listener_logged_traffic] runs the loop
//! on stdout the way the binary does, with a real listener that logs while the loop is waiting for input.

mod common;

use std::io::{self, BufReader, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::control::{Call, CallLog};
use common::fixtures::host;
use common::transport::mock_transport;
use gridnode::config::Configuration;
use gridnode::context::LocalContext;
use gridnode::control::Controller;
use gridnode::dispatcher::{self, LoopExit, PROMPT};
use gridnode::initialization::bootstrap;
use gridnode::membership::Membership;
use gridnode::messages::{ExchangeMessage, Message, RepairMessage, SimulationMessage};
use gridnode::networking::{TcpListenerService, TcpTransport, Transport};
use gridnode::routing::RoutingView;
use gridnode::services::{ExchangeService, RepairService, ServiceSet, SimulationService};
use gridnode::types::Host;

const REPAIR_USAGE_FIRST_LINE: &str = "repair: malformed command";
const KILLHOST_USAGE: &str = "A host name must follow the 'killhost' command.";

/// Run the command loop on `script` and return the recorded calls, the output, and how the loop ended.
fn run_script(script: &str) -> (CallLog, String, LoopExit) {
    run_bytes(script.as_bytes())
}

fn run_bytes(script: &[u8]) -> (CallLog, String, LoopExit) {
    common::setup_logger();
    let mut control = CallLog::default();
    let mut output = Vec::new();
    let exit = dispatcher::run(&mut control, Cursor::new(script), &mut output).unwrap();
    (control, String::from_utf8(output).unwrap(), exit)
}

#[test]
fn single_host_repair_is_dispatched_once() {
    let (control, _, _) = run_script("repair -i A -f B\n");
    assert_eq!(control.calls, vec![Call::RepairSingleHost("A".into(), "B".into())]);
}

#[test]
fn subtree_repair_forwards_path_as_typed() {
    let (control, _, _) = run_script("repair -i A -p /0/1\n");
    assert_eq!(control.calls, vec![Call::RepairSubtree("A".into(), "/0/1".into())]);
}

#[test]
fn malformed_repair_prints_usage_and_repairs_nothing() {
    let (control, output, _) = run_script("repair -z\nrepair -i A\nrepair -i A -x B\n");
    assert!(control.calls.is_empty());
    assert_eq!(output.matches(REPAIR_USAGE_FIRST_LINE).count(), 3);
}

#[test]
fn killhost_is_forwarded_without_membership_check() {
    let (control, _, _) = run_script("killhost node-7\n");
    assert_eq!(control.calls, vec![Call::KillHost("node-7".into())]);
}

#[test]
fn killhost_without_name_prints_usage_and_reprompts() {
    let (control, output, exit) = run_script("killhost\n");
    assert_eq!(control.count(|call| matches!(call, Call::KillHost(_))), 0);
    assert_eq!(output, format!("{}{}\n{}", PROMPT, KILLHOST_USAGE, PROMPT));
    assert_eq!(exit, LoopExit::EndOfInput);
}

#[test]
fn exit_shuts_down_once_and_stops_prompting() {
    let (control, output, exit) = run_script("exit\ninfo\nkillhost node-1\n");
    assert_eq!(exit, LoopExit::Exit);
    assert_eq!(control.calls, vec![Call::Exit]);
    assert_eq!(output, PROMPT);
}

#[test]
fn unrecognized_lines_are_ignored_silently() {
    let (control, output, exit) = run_script("\n   \nstatus\nkill node-1\n");
    assert!(control.calls.is_empty());
    assert_eq!(output, PROMPT.repeat(5));
    assert_eq!(exit, LoopExit::EndOfInput);
}

#[test]
fn invalid_utf8_line_is_ignored() {
    let (control, _, exit) = run_bytes(b"\xff\xfe\nkillhost node-1\nexit\n");
    assert_eq!(control.calls, vec![Call::KillHost("node-1".into()), Call::Exit]);
    assert_eq!(exit, LoopExit::Exit);
}

#[test]
fn info_writes_status() {
    let (_, output, _) = run_script("info\n");
    assert_eq!(output, format!("{}status\n{}", PROMPT, PROMPT));
}

#[test]
fn commands_reach_hosts_through_controller() {
    common::setup_logger();
    let context = Arc::new(LocalContext::new());
    let view = RoutingView::new(host("127.0.0.1", 4000, "ctl", ""), vec![]).unwrap();
    context.set_routing_view(view).unwrap();
    let membership = Membership::from_hosts(vec![
        host("node-1", 3001, "b", "0"),
        host("node-2", 3002, "c", "1"),
    ])
    .unwrap();

    let (transport, sent) = mock_transport();
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let counted = shutdowns.clone();
    let mut controller = Controller::new(context, membership, transport, move || {
        counted.fetch_add(1, Ordering::SeqCst);
    });

    let script = "killhost node-1\nkillhost node-7\nrepair -i node-2 -p 01\nexit\n";
    let mut output = Vec::new();
    let exit = dispatcher::run(&mut controller, Cursor::new(script), &mut output).unwrap();
    assert_eq!(exit, LoopExit::Exit);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("unknown host 'node-7'"));

    let (target, message) = sent.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(target.address, "node-1");
    assert_eq!(message, Message::from(SimulationMessage::Kill));

    let (target, message) = sent.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(target.address, "node-2");
    assert_eq!(message, Message::from(RepairMessage::ForceSubtree { path: "01".into() }));

    assert!(sent.try_recv().is_err());
}

/// Operator input that, on the first read, has a peer meet the controller and waits until the controller's
/// exchange service has handled the meeting. It then types `exit`.
struct MeetThenExit {
    controller: Host,
    met: Receiver<()>,
    typed: bool,
}

impl Read for MeetThenExit {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.typed {
            return Ok(0);
        }
        let origin = host("node-1", 3001, "b", "0");
        TcpTransport::new(&Configuration::default())
            .send(&self.controller, &ExchangeMessage::Meet { origin }.into())
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        let _ = self.met.recv_timeout(Duration::from_secs(2));

        let line = b"exit\n";
        buf[..line.len()].copy_from_slice(line);
        self.typed = true;
        Ok(line.len())
    }
}

#[test]
fn exit_returns_after_listener_logged_traffic() {
    common::setup_logger();
    let (met_sender, met) = mpsc::channel();
    let met_sender = Mutex::new(met_sender);

    let context = Arc::new(LocalContext::new());
    let services = ServiceSet {
        exchange: Arc::new(
            ExchangeService::builder()
                .context(context.clone())
                .on_meet(move |_| {
                    let _ = met_sender.lock().unwrap().send(());
                })
                .build(),
        ),
        repair: Arc::new(RepairService::builder().context(context.clone()).build()),
        simulation: Arc::new(SimulationService::builder().build()),
    };
    let view = RoutingView::new(host("127.0.0.1", 0, "ctl", ""), vec![]).unwrap();
    let config = Configuration::default();
    let listener = bootstrap(context.clone(), view, services, TcpListenerService::new(&config)).unwrap();
    let addr = listener.local_addr();

    let mut controller = Controller::new(context, Membership::default(), TcpTransport::new(&config), move || {
        drop(listener)
    });
    let input = BufReader::new(MeetThenExit {
        controller: host(&addr.ip().to_string(), addr.port(), "ctl", ""),
        met,
        typed: false,
    });

    let (done, outcome) = mpsc::channel();
    thread::spawn(move || {
        let _ = done.send(dispatcher::run_on_stdout(&mut controller, input).map_err(|err| err.kind()));
    });
    assert_eq!(outcome.recv_timeout(Duration::from_secs(10)), Ok(Ok(LoopExit::Exit)));
}
