/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The grid controller: loads its routing view and the network membership, starts its services, and reads
//! operator commands from stdin until `exit` or the end of input.

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use log::LevelFilter;

use gridnode::config::Configuration;
use gridnode::context::LocalContext;
use gridnode::control::Controller;
use gridnode::dispatcher::{self, LoopExit};
use gridnode::error::StartupError;
use gridnode::initialization::bootstrap;
use gridnode::logging::setup_logger;
use gridnode::networking::{TcpListenerService, TcpTransport};
use gridnode::persistence::{JsonFileLoader, RoutingViewLoader};
use gridnode::services::{ExchangeService, RepairService, ServiceSet, SimulationService};

#[derive(Parser)]
#[clap(name = "grid-controller", version)]
struct Args {
    /// The controller's routing view (JSON)
    routing_view: PathBuf,

    /// The network membership file (JSON)
    network: PathBuf,

    /// Minimum level of log messages to print
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(err) => {
            let _ = err.print();
            process::exit(StartupError::Arguments(err.to_string()).exit_code())
        }
    };

    let config = Configuration::builder().log_level(args.log_level).build();
    setup_logger(config.log_level);

    if let Err(err) = run(args, config) {
        log::error!("{}", err);
        process::exit(err.exit_code())
    }
}

fn run(args: Args, config: Configuration) -> Result<(), StartupError> {
    let view = JsonFileLoader.load(&args.routing_view)?;
    let membership = JsonFileLoader.load_membership(&args.network)?;

    let context = Arc::new(LocalContext::new());
    let services = ServiceSet {
        exchange: Arc::new(ExchangeService::builder().context(context.clone()).build()),
        repair: Arc::new(RepairService::builder().context(context.clone()).build()),
        simulation: Arc::new(SimulationService::builder().build()),
    };
    let listener = bootstrap(context.clone(), view, services, TcpListenerService::new(&config))?;

    let mut controller = Controller::new(context, membership, TcpTransport::new(&config), move || drop(listener));
    controller
        .announce(&mut io::stdout())
        .map_err(StartupError::Console)?;
    match dispatcher::run_on_stdout(&mut controller, io::stdin().lock()).map_err(StartupError::Console)? {
        LoopExit::Exit => log::info!("Controller exiting"),
        LoopExit::EndOfInput => log::info!("Controller exiting: end of input"),
    }
    Ok(())
}
