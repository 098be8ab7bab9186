use std::io::{self, Write};

use gridnode::control::Control;
use gridnode::error::ControlError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Exit,
    Info,
    KillHost(String),
    RepairSingleHost(String, String),
    RepairSubtree(String, String),
}

/// A [Control] that records every call it receives and succeeds at all of them.
#[derive(Default)]
pub(crate) struct CallLog {
    pub(crate) calls: Vec<Call>,
}

impl CallLog {
    pub(crate) fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }
}

impl Control for CallLog {
    fn exit(&mut self) {
        self.calls.push(Call::Exit)
    }

    fn info(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "status")
    }

    fn kill_host(&mut self, name: &str) -> Result<(), ControlError> {
        self.calls.push(Call::KillHost(name.to_string()));
        Ok(())
    }

    fn force_repair_single_host(&mut self, initiator: &str, failed: &str) -> Result<(), ControlError> {
        self.calls
            .push(Call::RepairSingleHost(initiator.to_string(), failed.to_string()));
        Ok(())
    }

    fn force_repair_subtree(&mut self, initiator: &str, path: &str) -> Result<(), ControlError> {
        self.calls
            .push(Call::RepairSubtree(initiator.to_string(), path.to_string()));
        Ok(())
    }
}
