//! The per-trainer slot grid the booking UI renders, and the slot toggle
//! behind each of its checkboxes.

use crate::{
    backend::FitnessBackend,
    error::BackendError,
    selection_store::BookingSelectionStore,
    types::{AddOutcome, Slot, TrainerId, TrainerSelection},
};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_SCHEDULE_DAYS: u32 = 3;

/// Start times offered every day.
pub const DAILY_SLOT_TIMES: [(u32, u32); 9] = [
    (9, 0),
    (10, 30),
    (12, 0),
    (13, 30),
    (15, 0),
    (16, 30),
    (18, 0),
    (19, 30),
    (21, 0),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub time_slot: Slot,
    pub selected_by_user: bool,
    pub selected_for_other_trainer: bool,
    pub server_booked: bool,
    pub past: bool,
    /// Whether the user may toggle the slot for this trainer.
    pub selectable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    TakenByOtherTrainer,
    Rejected,
}

pub fn daily_slots(date: NaiveDate) -> impl Iterator<Item = Slot> {
    DAILY_SLOT_TIMES.into_iter().filter_map(move |(hour, minute)| {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|time| Slot::new(date.and_time(time)))
    })
}

pub fn build_schedule(
    trainer_id: TrainerId,
    from: NaiveDate,
    days: u32,
    now: NaiveDateTime,
    server_booked: &[Slot],
    selections: &[TrainerSelection],
) -> Vec<ScheduleDay> {
    (0..days)
        .filter_map(|offset| from.checked_add_days(Days::new(offset.into())))
        .map(|date| ScheduleDay {
            date,
            slots: daily_slots(date)
                .map(|time_slot| {
                    let holders = selections
                        .iter()
                        .filter(|selection| selection.contains(&time_slot));
                    let (mine, others): (Vec<_>, Vec<_>) =
                        holders.partition(|selection| selection.trainer_id == trainer_id);
                    let selected_by_user = !mine.is_empty();
                    let selected_for_other_trainer = !others.is_empty();
                    let server_booked = server_booked.contains(&time_slot);
                    let past = !time_slot.is_after(now);

                    SlotView {
                        time_slot,
                        selected_by_user,
                        selected_for_other_trainer,
                        server_booked,
                        past,
                        selectable: !(server_booked || past)
                            && (selected_by_user || !selected_for_other_trainer),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Parses the backend's booked slots, skipping entries it cannot read.
pub fn parse_server_slots(raw: &[String]) -> Vec<Slot> {
    raw.iter()
        .filter_map(|value| {
            let slot = Slot::parse_lenient(value);
            if slot.is_none() {
                debug!(%value, "Ignoring unreadable booked slot from backend");
            }
            slot
        })
        .collect()
}

/// Flips the selection of `slot` for `trainer_id`, refusing slots the user
/// already holds for another trainer.
pub fn toggle_slot(store: &BookingSelectionStore, slot: Slot, trainer_id: TrainerId) -> ToggleOutcome {
    let selected_by_user = store
        .selection_for(trainer_id)
        .is_some_and(|selection| selection.contains(&slot));
    if selected_by_user {
        store.remove_slots(&[slot], trainer_id);
        return ToggleOutcome::Deselected;
    }

    if let Some(owner) = store.owner_of(&slot) {
        debug!(%slot, trainer_id, owner, "Slot already selected for another trainer");
        return ToggleOutcome::TakenByOtherTrainer;
    }

    match store.add_slot(slot, trainer_id) {
        AddOutcome::Added | AddOutcome::AlreadySelected => ToggleOutcome::Selected,
        AddOutcome::Rejected => ToggleOutcome::Rejected,
    }
}

/// Grid for one trainer. Selected slots the backend now reports as booked are
/// deselected first.
pub async fn trainer_schedule<B: FitnessBackend>(
    store: &BookingSelectionStore,
    backend: &B,
    trainer_id: TrainerId,
    from: NaiveDate,
    days: u32,
) -> Result<Vec<ScheduleDay>, BackendError> {
    let trainer = backend.fetch_trainer_detail(trainer_id).await?;
    let server_booked = parse_server_slots(&trainer.booked_slots);

    if let Some(selection) = store.selection_for(trainer_id) {
        let taken: Vec<Slot> = selection
            .time_slots
            .into_iter()
            .filter(|slot| server_booked.contains(slot))
            .collect();
        if !taken.is_empty() {
            info!(trainer_id, taken = taken.len(), "Deselecting slots booked in the meantime");
            store.remove_slots(&taken, trainer_id);
        }
    }

    Ok(build_schedule(
        trainer_id,
        from,
        days,
        store.now(),
        &server_booked,
        &store.selections(),
    ))
}

/// Entering a trainer's scheduling view starts from a clean selection.
pub async fn open_schedule<B: FitnessBackend>(
    store: &BookingSelectionStore,
    backend: &B,
    trainer_id: TrainerId,
    from: NaiveDate,
    days: u32,
) -> Result<Vec<ScheduleDay>, BackendError> {
    store.clear_trainer_selection(trainer_id);
    trainer_schedule(store, backend, trainer_id, from, days).await
}
