use crate::{configuration::Configuration, schedule::DEFAULT_SCHEDULE_DAYS};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "booking_selection",
    about = "Keeps the booking UI's tentative slot selections across reloads"
)]
pub struct ConfigurationHandler {
    /// Port of the local API used by the booking UI
    #[arg(long, env = "BOOKING_SELECTION_PORT", default_value = "3000")]
    port: String,

    /// Directory for persisted selections (in memory when omitted)
    #[arg(long, env = "BOOKING_SELECTION_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Base URL of the fitness backend
    #[arg(long, env = "FITNESS_BACKEND_URL", default_value = "http://127.0.0.1:8000")]
    backend_url: String,

    /// Number of days shown in a trainer's schedule
    #[arg(
        long,
        env = "SCHEDULE_DAYS",
        default_value_t = DEFAULT_SCHEDULE_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=31)
    )]
    schedule_days: u32,

    /// Timeout for requests to the fitness backend, in seconds
    #[arg(long, env = "FITNESS_BACKEND_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> String {
        self.port.clone()
    }

    fn storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir.clone()
    }

    fn backend_url(&self) -> String {
        self.backend_url.clone()
    }

    fn schedule_days(&self) -> u32 {
        self.schedule_days
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
