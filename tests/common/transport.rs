use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use gridnode::error::TransportError;
use gridnode::messages::Message;
use gridnode::networking::Transport;
use gridnode::types::Host;

/// A mock transport which passes every message it is asked to send to a channel instead of the network.
#[derive(Clone)]
pub(crate) struct TransportStub {
    outbox: Arc<Mutex<Sender<(Host, Message)>>>,
}

impl Transport for TransportStub {
    fn send(&self, target: &Host, message: &Message) -> Result<(), TransportError> {
        let _ = self.outbox.lock().unwrap().send((target.clone(), message.clone()));
        Ok(())
    }
}

pub(crate) fn mock_transport() -> (TransportStub, Receiver<(Host, Message)>) {
    let (sender, receiver) = mpsc::channel();
    let stub = TransportStub {
        outbox: Arc::new(Mutex::new(sender)),
    };
    (stub, receiver)
}
