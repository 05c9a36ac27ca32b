use crate::{
    error::BackendError,
    types::{Slot, TrainerId},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The remote fitness backend, which owns availability and the real bookings.
#[async_trait]
pub trait FitnessBackend: Clone + Send + Sync + 'static {
    async fn fetch_trainer_detail(&self, trainer_id: TrainerId)
        -> Result<TrainerDetail, BackendError>;

    async fn create_records(
        &self,
        trainer_id: TrainerId,
        time_slots: &[Slot],
    ) -> Result<CreateRecordsResponse, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerDetail {
    pub id: TrainerId,
    /// Slots the backend already holds records for, as sent by the backend.
    #[serde(default)]
    pub booked_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordsRequest {
    pub trainer_id: TrainerId,
    pub time_slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl CreateRecordsResponse {
    pub fn errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }
}
