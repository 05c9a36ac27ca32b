use std::{path::PathBuf, time::Duration};

pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> String;
    /// Directory for persisted selections. Without one they live in memory.
    fn storage_dir(&self) -> Option<PathBuf>;
    fn backend_url(&self) -> String;
    fn schedule_days(&self) -> u32;
    fn request_timeout(&self) -> Duration;
}
