/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Error types for every stage of a node's life.
//!
//! Startup errors ([LoadError], [RegistrationError], listener failures) are terminal: the binaries log them
//! and exit with [StartupError::exit_code]. Command-level errors ([CommandFormatError], [ControlError]) are
//! local to one command of the controller's loop and never stop the process.

use std::io;
use std::path::PathBuf;

use crate::services::ServiceKind;
use crate::types::{HostId, HostPath};

/// Why a routing view or membership file was rejected.
#[derive(Debug, thiserror::Error)]
pub enum MalformedReason {
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    #[error("identifier '{0}' appears more than once")]
    DuplicateId(HostId),

    #[error("path '{0}' is occupied by more than one host")]
    DuplicatePath(HostPath),

    #[error("host name '{0}' appears more than once")]
    DuplicateName(String),

    #[error("path '{0}' contains characters other than '0' and '1'")]
    InvalidPath(HostPath),
}

/// Failure to produce a routing view (or a membership map) from a file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is malformed: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        reason: MalformedReason,
    },
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("the local routing view has already been set")]
    AlreadySet,
}

/// Failure to register one of the three services.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("a {actual} service was handed over in the {expected} slot")]
    KindMismatch {
        expected: ServiceKind,
        actual: ServiceKind,
    },

    #[error("the {0} service needs a configured local context")]
    NotConfigured(ServiceKind),

    #[error("a {0} service is already registered")]
    AlreadyRegistered(ServiceKind),
}

/// Errors that terminate a node process. All but [StartupError::Console] abort the node before it becomes
/// reachable.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{0}")]
    Arguments(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("error during service registration: {0}")]
    Registration(#[from] RegistrationError),

    #[error("cannot start the service listener: {0}")]
    Listener(#[source] io::Error),

    /// The controller could not read commands or write their output.
    #[error("the operator console failed: {0}")]
    Console(#[source] io::Error),
}

impl StartupError {
    /// The process exit code operators and scripts rely on.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Arguments(_) | StartupError::Load(_) | StartupError::Context(_) => 1,
            StartupError::Registration(_) => 2,
            StartupError::Listener(_) => 3,
            StartupError::Console(_) => 4,
        }
    }
}

/// Failure to deliver one frame to a remote host.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot resolve {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("frame of {0} bytes exceeds the maximum frame size")]
    FrameTooLarge(usize),
}

/// Failure of one controller action. Printed by the command loop, which then carries on.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("unknown host '{0}'")]
    UnknownHost(String),

    #[error("cannot reach {host}: {source}")]
    Transport {
        host: String,
        #[source]
        source: TransportError,
    },
}

/// Malformed operator input. Displays as the usage text that is printed back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandFormatError {
    #[error("A host name must follow the 'killhost' command.")]
    KillHostUsage,

    #[error(
        "repair: malformed command\n\
         'repair -i <hostname> -f <hostname>'\n\
         'repair -i <hostname> -p <subtree path>'\n\
         Where -i: the initiator host name\n      \
         -f: the failed host name\n      \
         -p: the path of the failed subtree"
    )]
    RepairUsage,
}
