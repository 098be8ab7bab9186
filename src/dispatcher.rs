/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The controller's command loop.
//!
//! [run] prints a [PROMPT], reads one line, and fully processes it before reading the next. Lines are split on
//! whitespace and matched against the following commands:
//!
//! | Input                     | Action                                                        |
//! |---------------------------|---------------------------------------------------------------|
//! | `exit`                    | [Control::exit], then leave the loop.                         |
//! | `info`                    | [Control::info].                                              |
//! | `killhost <name>`         | [Control::kill_host].                                         |
//! | `repair -i <A> -f <B>`    | [Control::force_repair_single_host].                          |
//! | `repair -i <A> -p <path>` | [Control::force_repair_subtree].                              |
//!
//! A malformed `killhost` or `repair` prints the command's usage. Every other line, empty lines included, is
//! ignored without output.

use std::io::{self, BufRead, Write};

use crate::control::Control;
use crate::error::CommandFormatError;

pub const PROMPT: &str = "grid> ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Exit,
    Info,
    KillHost(String),
    RepairSingleHost { initiator: String, failed: String },
    RepairSubtree { initiator: String, path: String },
}

/// Parse one line of operator input. Returns `Ok(None)` for lines that are not commands.
pub fn parse(line: &str) -> Result<Option<Command>, CommandFormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((verb, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match *verb {
        "exit" => Command::Exit,
        "info" => Command::Info,
        "killhost" => match args {
            [name] => Command::KillHost(name.to_string()),
            _ => return Err(CommandFormatError::KillHostUsage),
        },
        "repair" => match args {
            ["-i", initiator, "-f", failed] => Command::RepairSingleHost {
                initiator: initiator.to_string(),
                failed: failed.to_string(),
            },
            ["-i", initiator, "-p", path] => Command::RepairSubtree {
                initiator: initiator.to_string(),
                path: path.to_string(),
            },
            _ => return Err(CommandFormatError::RepairUsage),
        },
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// How the command loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The operator typed `exit`.
    Exit,
    /// `input` was exhausted.
    EndOfInput,
}

/// Run the command loop until `exit` or the end of `input`.
///
/// Usage texts and the errors of failed actions are written to `output`; neither ends the loop. Input that is not
/// valid UTF-8 is decoded lossily. Only a failure to read `input` or write `output` ends the loop early.
pub fn run<C, R, W>(control: &mut C, mut input: R, mut output: W) -> io::Result<LoopExit>
where
    C: Control + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut line = Vec::new();
    loop {
        output.write_all(PROMPT.as_bytes())?;
        output.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(LoopExit::EndOfInput);
        }

        // Invalid UTF-8 is replaced, so a garbled line is ignored like any other non-command.
        let command = match parse(&String::from_utf8_lossy(&line)) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                writeln!(output, "{}", usage)?;
                continue;
            }
        };

        let result = match command {
            Command::Exit => {
                control.exit();
                output.flush()?;
                return Ok(LoopExit::Exit);
            }
            Command::Info => {
                control.info(&mut output)?;
                Ok(())
            }
            Command::KillHost(name) => control.kill_host(&name),
            Command::RepairSingleHost { initiator, failed } => control.force_repair_single_host(&initiator, &failed),
            Command::RepairSubtree { initiator, path } => control.force_repair_subtree(&initiator, &path),
        };
        if let Err(err) = result {
            log::warn!("Command failed: {}", err);
            writeln!(output, "{}", err)?;
        }
    }
}

/// Run the command loop on `input`, writing to the process's stdout.
///
/// Stdout is locked once per write, never for the whole loop: the log backend writes to stdout from the
/// listener thread, and [Control::exit] may join that thread.
pub fn run_on_stdout<C, R>(control: &mut C, input: R) -> io::Result<LoopExit>
where
    C: Control + ?Sized,
    R: BufRead,
{
    run(control, input, io::stdout())
}
