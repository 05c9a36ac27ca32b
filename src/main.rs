use std::sync::Arc;

use crate::{
    backend::FitnessBackend,
    clock::SystemClock,
    configuration::Configuration,
    configuration_handler::ConfigurationHandler,
    http::create_app,
    http_backend::HttpFitnessBackend,
    selection_store::BookingSelectionStore,
    storage::{FileStorage, MemoryStorage, SelectionStorage},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod backend;
mod clock;
mod configuration;
mod configuration_handler;
mod confirmation;
mod error;
mod http;
mod http_backend;
mod schedule;
mod selection_state;
mod selection_store;
mod storage;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Clone)]
pub struct AppState<T: FitnessBackend> {
    pub store: BookingSelectionStore,
    pub backend: T,
    pub schedule_days: u32,
}

fn open_storage(configuration: &impl Configuration) -> Arc<dyn SelectionStorage> {
    let Some(dir) = configuration.storage_dir() else {
        info!("No storage directory configured, selections are kept in memory");
        return Arc::new(MemoryStorage::default());
    };

    match FileStorage::new(dir.clone()) {
        Ok(storage) => {
            info!(dir = %storage.dir().display(), "Persisting selections");
            Arc::new(storage)
        }
        Err(err) => {
            warn!(?err, dir = %dir.display(), "Storage directory unusable, selections are kept in memory");
            Arc::new(MemoryStorage::default())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let store = BookingSelectionStore::new(open_storage(&configuration), Arc::new(SystemClock));
    let backend = match HttpFitnessBackend::new(
        &configuration.backend_url(),
        configuration.request_timeout(),
    ) {
        Ok(backend) => backend,
        Err(err) => {
            error!(?err, "Failed to create fitness backend client");
            return;
        }
    };
    info!(backend_url = %configuration.backend_url(), "Using fitness backend");

    let state = AppState {
        store,
        backend,
        schedule_days: configuration.schedule_days(),
    };

    let address = format!("127.0.0.1:{}", configuration.port());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, %address, "Failed to bind booking selection API");
            return;
        }
    };
    info!(%address, "Booking selection API listening");

    if let Err(err) = axum::serve(listener, create_app(state)).await {
        error!(?err, "Booking selection API stopped");
    }
}
