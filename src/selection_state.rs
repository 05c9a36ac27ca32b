use crate::types::{AddOutcome, Slot, TrainerId, TrainerSelection};
use chrono::NaiveDateTime;

/// Tentative slot selections of the current user, one entry per trainer.
///
/// Every entry holds at least one slot and no slot twice. The functions here
/// are pure state transitions; persistence and notification live in
/// [`crate::selection_store::BookingSelectionStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingSelectionState {
    selections: Vec<TrainerSelection>,
}

impl BookingSelectionState {
    /// Builds a state from stored entries, merging entries of the same trainer
    /// and dropping duplicate slots and empty entries.
    pub fn from_persisted(persisted: Vec<TrainerSelection>) -> Self {
        let mut state = Self::default();
        for entry in persisted {
            for slot in entry.time_slots {
                state.insert(slot, entry.trainer_id);
            }
        }
        state
    }

    pub fn selections(&self) -> &[TrainerSelection] {
        &self.selections
    }

    pub fn selection_for(&self, trainer_id: TrainerId) -> Option<&TrainerSelection> {
        self.selections
            .iter()
            .find(|selection| selection.trainer_id == trainer_id)
    }

    pub fn owner_of(&self, slot: &Slot) -> Option<TrainerId> {
        self.selections
            .iter()
            .find(|selection| selection.contains(slot))
            .map(|selection| selection.trainer_id)
    }

    pub fn add_slot(&mut self, slot: Slot, trainer_id: TrainerId, now: NaiveDateTime) -> AddOutcome {
        if !slot.is_after(now) {
            return AddOutcome::Rejected;
        }
        if self.insert(slot, trainer_id) {
            AddOutcome::Added
        } else {
            AddOutcome::AlreadySelected
        }
    }

    /// Returns whether anything was removed.
    pub fn remove_slots(&mut self, slots: &[Slot], trainer_id: TrainerId) -> bool {
        let Some(index) = self.position(trainer_id) else {
            return false;
        };

        let time_slots = &mut self.selections[index].time_slots;
        let before = time_slots.len();
        time_slots.retain(|slot| !slots.contains(slot));
        let removed = time_slots.len() != before;

        if time_slots.is_empty() {
            self.selections.remove(index);
        }
        removed
    }

    /// Returns whether the trainer had a selection.
    pub fn clear_trainer(&mut self, trainer_id: TrainerId) -> bool {
        match self.position(trainer_id) {
            Some(index) => {
                self.selections.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Drops every slot that is not after `now`, then every emptied entry.
    /// Returns the number of dropped slots.
    pub fn prune_past(&mut self, now: NaiveDateTime) -> usize {
        let mut pruned = 0;
        for selection in &mut self.selections {
            let before = selection.time_slots.len();
            selection.time_slots.retain(|slot| slot.is_after(now));
            pruned += before - selection.time_slots.len();
        }
        self.selections
            .retain(|selection| !selection.time_slots.is_empty());
        pruned
    }

    fn position(&self, trainer_id: TrainerId) -> Option<usize> {
        self.selections
            .iter()
            .position(|selection| selection.trainer_id == trainer_id)
    }

    fn insert(&mut self, slot: Slot, trainer_id: TrainerId) -> bool {
        match self.position(trainer_id) {
            Some(index) => {
                let selection = &mut self.selections[index];
                if selection.contains(&slot) {
                    return false;
                }
                selection.time_slots.push(slot);
            }
            None => self
                .selections
                .push(TrainerSelection::new(trainer_id, slot)),
        }
        true
    }
}
