use crate::types::TrainerId;

/// Failure of the key/value storage that keeps selections across reloads.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode selections: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure while talking to the remote fitness backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request to fitness backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Fitness backend answered {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Unreadable response from fitness backend (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error("No time slots selected for trainer {0}")]
    NothingSelected(TrainerId),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
