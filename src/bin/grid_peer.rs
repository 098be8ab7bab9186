/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A grid peer: loads its routing view, starts its services, and meets other hosts until the controller
//! kills it.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use log::LevelFilter;

use gridnode::config::Configuration;
use gridnode::context::LocalContext;
use gridnode::error::StartupError;
use gridnode::initialization::bootstrap;
use gridnode::logging::setup_logger;
use gridnode::meeting::{start_meetings, ExchangeMeeting, MeetingSchedule};
use gridnode::networking::{TcpListenerService, TcpTransport};
use gridnode::persistence::{JsonFileLoader, RoutingViewLoader};
use gridnode::services::{ExchangeService, RepairService, ServiceSet, SimulationService};

#[derive(Parser)]
#[clap(name = "grid-peer", version)]
struct Args {
    /// The peer's routing view (JSON)
    routing_view: PathBuf,

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

    let context = Arc::new(LocalContext::new());
    let services = ServiceSet {
        exchange: Arc::new(ExchangeService::builder().context(context.clone()).build()),
        repair: Arc::new(RepairService::builder().context(context.clone()).build()),
        simulation: Arc::new(
            SimulationService::builder()
                .on_kill(|_| {
                    log::info!("Terminating on the controller's order");
                    process::exit(0);
                })
                .build(),
        ),
    };
    let listener = bootstrap(context.clone(), view, services, TcpListenerService::new(&config))?;

    let schedule = MeetingSchedule::from_clock(config.meeting_initial_delay);
    let meeting = Arc::new(ExchangeMeeting::new(context, TcpTransport::new(&config)));
    let _meetings = start_meetings(schedule, meeting);

    listener.wait();
    Ok(())
}
