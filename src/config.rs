use std::time::Duration;

use log::LevelFilter;
use typed_builder::TypedBuilder;

/// Configuration as specified by the operator. Every field has a default, so `Configuration::builder().build()`
/// is a valid configuration.
///
/// ## Timeouts
///
/// The controller sends its commands synchronously from the command loop. [Configuration::connect_timeout] and
/// [Configuration::io_timeout] bound how long one unresponsive host can stall the loop.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Configuration {
    #[builder(default = Duration::from_secs(3), setter(doc = "Set how long to wait for a TCP connection to a remote host. Optional."))]
    pub connect_timeout: Duration,
    #[builder(default = Duration::from_secs(3), setter(doc = "Set how long to wait for a frame to be written or read. Optional."))]
    pub io_timeout: Duration,
    #[builder(default = Duration::from_millis(10), setter(doc = "Set how often the listener checks for new connections and shutdown. Optional."))]
    pub accept_poll_interval: Duration,
    #[builder(default = Duration::from_secs(5), setter(doc = "Set the delay before the first meeting of a peer. Optional."))]
    pub meeting_initial_delay: Duration,
    #[builder(default = LevelFilter::Info, setter(doc = "Set the minimum level of log messages to print. Optional."))]
    pub log_level: LevelFilter,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::builder().build()
    }
}
