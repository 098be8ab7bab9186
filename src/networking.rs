/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definitions](Listener) for the inbound and [outbound](Transport) sides of a node's networking, and
//! their TCP implementations.
//!
//! Nodes talk to each other one frame per connection. A frame is a 4-byte little-endian length followed by
//! the borsh encoding of a [Message]:
//!
//! ```text
//! +----------------+----------------------------+
//! | len: u32 (LE)  | borsh(Message), len bytes  |
//! +----------------+----------------------------+
//! ```
//!
//! The [TcpListenerService] runs on its own thread, decodes one frame from every connection it accepts, and
//! routes the message to the [registered service](ServiceRegistry) of its kind. The [TcpTransport] opens a new
//! connection for every frame it sends, so a sender never holds on to a remote host between commands.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::config::Configuration;
use crate::error::TransportError;
use crate::logging;
use crate::messages::Message;
use crate::services::ServiceRegistry;
use crate::types::Host;

/// Frames larger than this are rejected by both sides.
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Makes the registered services of a node reachable.
pub trait Listener {
    /// Keeps the listener alive. Dropping it may stop the listener.
    type Handle;

    /// Start accepting traffic for `localhost`, routing every message through `services`. Errors that prevent
    /// the listener from starting (e.g., the port is taken) must be returned, not deferred.
    fn start(&mut self, localhost: &Host, services: Arc<ServiceRegistry>) -> io::Result<Self::Handle>;
}

/// Delivers messages to remote hosts.
///
/// `send` may be called from several threads at once (e.g., overlapping meetings).
pub trait Transport: Send + Sync {
    fn send(&self, target: &Host, message: &Message) -> Result<(), TransportError>;
}

/// Write `message` as one frame.
pub fn write_frame<W: Write>(writer: &mut W, message: &Message) -> Result<(), TransportError> {
    let bytes = message.try_to_vec()?;
    if bytes.len() > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(bytes.len()));
    }
    writer.write_all(&(bytes.len() as u32).to_le_bytes())?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame and decode the message it carries.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Message, TransportError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(len));
    }
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    Ok(Message::try_from_slice(&bytes)?)
}

/// Sends every message over a fresh TCP connection, with bounded connect and write times.
#[derive(Clone, Debug)]
pub struct TcpTransport {
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TcpTransport {
    pub fn new(config: &Configuration) -> TcpTransport {
        TcpTransport {
            connect_timeout: config.connect_timeout,
            io_timeout: config.io_timeout,
        }
    }
}

impl Transport for TcpTransport {
    fn send(&self, target: &Host, message: &Message) -> Result<(), TransportError> {
        let addr = target.socket_addr().map_err(|source| TransportError::Resolve {
            address: target.address.clone(),
            source,
        })?;
        let mut stream = TcpStream::connect_timeout(&addr, self.connect_timeout)?;
        stream.set_write_timeout(Some(self.io_timeout))?;
        write_frame(&mut stream, message)?;
        logging::debug::sent_command(message.service_kind(), target);
        Ok(())
    }
}

/// Accepts connections on the local host's port from a dedicated thread.
#[derive(Clone, Debug)]
pub struct TcpListenerService {
    io_timeout: Duration,
    poll_interval: Duration,
}

impl TcpListenerService {
    pub fn new(config: &Configuration) -> TcpListenerService {
        TcpListenerService {
            io_timeout: config.io_timeout,
            poll_interval: config.accept_poll_interval,
        }
    }
}

impl Listener for TcpListenerService {
    type Handle = ListenerHandle;

    fn start(&mut self, localhost: &Host, services: Arc<ServiceRegistry>) -> io::Result<ListenerHandle> {
        let listener = TcpListener::bind((localhost.address.as_str(), localhost.port))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let (shutdown, shutdown_receiver) = mpsc::channel();
        let io_timeout = self.io_timeout;
        let poll_interval = self.poll_interval;
        let thread = thread::spawn(move || {
            accept_loop(listener, services, shutdown_receiver, io_timeout, poll_interval)
        });
        logging::info::started_listener(local_addr);

        Ok(ListenerHandle {
            local_addr,
            thread: Some(thread),
            shutdown,
        })
    }
}

fn accept_loop(
    listener: TcpListener,
    services: Arc<ServiceRegistry>,
    shutdown_signal: Receiver<()>,
    io_timeout: Duration,
    poll_interval: Duration,
) {
    loop {
        match shutdown_signal.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => (),
        }

        match listener.accept() {
            Ok((stream, sender)) => {
                if let Err(err) = serve(stream, sender, &services, io_timeout) {
                    log::warn!("Dropping connection from {}: {}", sender, err);
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => thread::sleep(poll_interval),
            Err(err) => {
                log::warn!("Failed to accept a connection: {}", err);
                thread::sleep(poll_interval)
            }
        }
    }
}

fn serve(
    mut stream: TcpStream,
    sender: SocketAddr,
    services: &ServiceRegistry,
    io_timeout: Duration,
) -> Result<(), TransportError> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(io_timeout))?;
    let message = read_frame(&mut stream)?;
    services.dispatch(sender, message);
    Ok(())
}

/// A handle to the listener thread. When this value is dropped, the thread is shut down and joined.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
    shutdown: Sender<()>,
}

impl ListenerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block the calling thread for as long as the listener runs.
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The listener thread panicked");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.shutdown.send(());
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ExchangeMessage, RepairMessage, SimulationMessage};
    use crate::types::{HostId, HostPath};

    fn frame(message: &Message) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_frame(&mut bytes, message).unwrap();
        bytes
    }

    #[test]
    fn frame_is_length_prefixed() {
        let message = Message::from(RepairMessage::ForceSubtree { path: "/0/1".into() });
        let bytes = frame(&message);
        let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        assert_eq!(len, bytes.len() - 4);
        assert_eq!(read_frame(&mut bytes.as_slice()).unwrap(), message);
    }

    #[test]
    fn meet_carries_origin() {
        let origin = Host::new("node-1", 3001, HostId::new("b"), HostPath::new("01"));
        let message = Message::from(ExchangeMessage::Meet { origin });
        assert_eq!(read_frame(&mut frame(&message).as_slice()).unwrap(), message);
    }

    #[test]
    fn oversized_length_is_rejected_before_reading_body() {
        let mut bytes = ((MAX_FRAME_LEN + 1) as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            read_frame(&mut bytes.as_slice()),
            Err(TransportError::FrameTooLarge(len)) if len == MAX_FRAME_LEN + 1
        ));
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let mut bytes = frame(&Message::from(SimulationMessage::Kill));
        bytes.truncate(3);
        assert!(matches!(read_frame(&mut bytes.as_slice()), Err(TransportError::Io(_))));
    }
}
