pub(crate) mod control;

pub(crate) mod fixtures;

pub(crate) mod transport;

use log::LevelFilter;

// Set up a logger that logs all log messages with level Trace and above.
pub(crate) fn setup_logger() {
    gridnode::logging::setup_logger(LevelFilter::Trace)
}
