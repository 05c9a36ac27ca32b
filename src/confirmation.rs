use crate::{
    backend::FitnessBackend, error::ConfirmError, selection_store::BookingSelectionStore,
    types::TrainerId,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// Records were created. `errors` lists slots the backend skipped.
    Confirmed {
        message: Option<String>,
        errors: Vec<String>,
    },
    /// The backend refused every slot; its messages are passed on unchanged.
    Rejected {
        error: Option<String>,
        errors: Vec<String>,
    },
}

/// Submits the trainer's selection and forgets it once the backend accepted it.
pub async fn confirm_booking<B: FitnessBackend>(
    store: &BookingSelectionStore,
    backend: &B,
    trainer_id: TrainerId,
) -> Result<ConfirmOutcome, ConfirmError> {
    let selection = store
        .selection_for(trainer_id)
        .ok_or(ConfirmError::NothingSelected(trainer_id))?;

    let response = backend
        .create_records(trainer_id, &selection.time_slots)
        .await
        .map_err(|err| {
            warn!(?err, trainer_id, "Booking confirmation failed");
            err
        })?;
    let errors = response.errors().to_vec();

    if response.success {
        store.clear_trainer_selection(trainer_id);
        info!(
            trainer_id,
            slots = selection.time_slots.len(),
            skipped = errors.len(),
            "Booking confirmed"
        );
        Ok(ConfirmOutcome::Confirmed {
            message: response.message,
            errors,
        })
    } else {
        info!(trainer_id, ?errors, "Booking rejected by backend");
        Ok(ConfirmOutcome::Rejected {
            error: response.error,
            errors,
        })
    }
}
