use crate::{
    backend::{CreateRecordsRequest, CreateRecordsResponse, FitnessBackend, TrainerDetail},
    error::BackendError,
    types::{Slot, TrainerId},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// [`FitnessBackend`] over the backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpFitnessBackend {
    client: Client,
    base_url: String,
}

impl HttpFitnessBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl FitnessBackend for HttpFitnessBackend {
    async fn fetch_trainer_detail(
        &self,
        trainer_id: TrainerId,
    ) -> Result<TrainerDetail, BackendError> {
        let url = format!("{}/api/trainers/{trainer_id}/", self.base_url);
        debug!(%url, "Fetching trainer detail");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Trainer detail request failed");
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json().await?)
    }

    async fn create_records(
        &self,
        trainer_id: TrainerId,
        time_slots: &[Slot],
    ) -> Result<CreateRecordsResponse, BackendError> {
        let url = format!("{}/api/records/create/", self.base_url);
        let request = CreateRecordsRequest {
            trainer_id,
            time_slots: time_slots.to_vec(),
        };
        debug!(%url, trainer_id, slots = time_slots.len(), "Submitting records");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();

        // Validation failures come back as 4xx with the same body shape.
        if !status.is_success() && !status.is_client_error() {
            warn!(%url, %status, "Record creation request failed");
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| BackendError::Decode {
            status: status.as_u16(),
            source,
        })
    }
}
