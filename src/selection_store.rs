use crate::{
    clock::Clock,
    error::StorageError,
    selection_state::BookingSelectionState,
    storage::SelectionStorage,
    types::{AddOutcome, Slot, TrainerId, TrainerSelection},
};
use chrono::NaiveDateTime;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

pub const BOOKED_SLOTS_KEY: &str = "bookedSlots";

/// Session-wide store of the slots a user picked but has not confirmed yet.
///
/// Clones share the same state. Every mutation is written to the storage under
/// [`BOOKED_SLOTS_KEY`] and published to subscribers. None of the operations
/// fail: corrupt stored data counts as no data, and once a write fails the
/// store keeps working in memory only.
#[derive(Clone)]
pub struct BookingSelectionStore {
    state: Arc<Mutex<BookingSelectionState>>,
    storage: Arc<dyn SelectionStorage>,
    clock: Arc<dyn Clock>,
    persistence_enabled: Arc<AtomicBool>,
    sender: Arc<Sender<Vec<TrainerSelection>>>,
}

impl BookingSelectionStore {
    /// Creates the store and hydrates it from `storage` via [`Self::reconcile`].
    pub fn new(storage: Arc<dyn SelectionStorage>, clock: Arc<dyn Clock>) -> Self {
        let (sender, _) = watch::channel(vec![]);
        let store = Self {
            state: Arc::new(Mutex::default()),
            storage,
            clock,
            persistence_enabled: Arc::new(AtomicBool::new(true)),
            sender: Arc::new(sender),
        };
        store.reconcile();
        store
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn selections(&self) -> Vec<TrainerSelection> {
        self.state().selections().to_vec()
    }

    pub fn selection_for(&self, trainer_id: TrainerId) -> Option<TrainerSelection> {
        self.state().selection_for(trainer_id).cloned()
    }

    pub fn owner_of(&self, slot: &Slot) -> Option<TrainerId> {
        self.state().owner_of(slot)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence_enabled.load(Ordering::SeqCst)
    }

    /// Yields the current selections right away and again after every change.
    pub fn subscribe(&self) -> WatchStream<Vec<TrainerSelection>> {
        WatchStream::new(self.sender.subscribe())
    }

    pub fn add_slot(&self, slot: Slot, trainer_id: TrainerId) -> AddOutcome {
        let now = self.clock.now();
        let mut state = self.state();
        let outcome = state.add_slot(slot, trainer_id, now);

        match outcome {
            AddOutcome::Added => {
                debug!(%slot, trainer_id, "Slot selected");
                self.commit(&state);
            }
            AddOutcome::AlreadySelected => debug!(%slot, trainer_id, "Slot was already selected"),
            AddOutcome::Rejected => {
                info!(%slot, trainer_id, %now, "Rejected selection of a slot that is not in the future")
            }
        }
        outcome
    }

    pub fn remove_slots(&self, slots: &[Slot], trainer_id: TrainerId) {
        let mut state = self.state();
        let removed = state.remove_slots(slots, trainer_id);
        debug!(trainer_id, removed, requested = slots.len(), "Slots deselected");
        self.commit(&state);
    }

    pub fn clear_trainer_selection(&self, trainer_id: TrainerId) {
        let mut state = self.state();
        if state.clear_trainer(trainer_id) {
            debug!(trainer_id, "Trainer selection cleared");
        }
        self.commit(&state);
    }

    /// Drops the whole selection and its stored copy, as on sign-out.
    pub fn clear_all(&self) {
        let mut state = self.state();
        state.clear();

        if self.is_persistent() {
            if let Err(err) = self.storage.remove(BOOKED_SLOTS_KEY) {
                self.disable_persistence(&err);
            }
        }
        self.sender.send_replace(vec![]);
        info!("All booking selections cleared");
    }

    /// Reloads the stored selections and drops every slot that is no longer in
    /// the future. Returns the selections that remain.
    pub fn reconcile(&self) -> Vec<TrainerSelection> {
        let loaded = self.load();
        let mut reconciled = BookingSelectionState::from_persisted(loaded);
        let expired = reconciled.prune_past(self.clock.now());

        let mut state = self.state();
        *state = reconciled;
        info!(
            trainers = state.selections().len(),
            expired, "Booking selections reconciled"
        );
        self.commit(&state);
        state.selections().to_vec()
    }

    fn load(&self) -> Vec<TrainerSelection> {
        if !self.is_persistent() {
            return self.selections();
        }

        let stored = match self.storage.get(BOOKED_SLOTS_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return vec![],
            Err(err) => {
                self.disable_persistence(&err);
                return self.selections();
            }
        };

        match serde_json::from_str(&stored) {
            Ok(selections) => selections,
            Err(err) => {
                warn!(?err, "Discarding unreadable stored booking selections");
                vec![]
            }
        }
    }

    fn commit(&self, state: &BookingSelectionState) {
        self.persist(state);
        self.sender.send_replace(state.selections().to_vec());
    }

    fn persist(&self, state: &BookingSelectionState) {
        if !self.is_persistent() {
            return;
        }

        let result = serde_json::to_string(state.selections())
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(BOOKED_SLOTS_KEY, &json));

        if let Err(err) = result {
            self.disable_persistence(&err);
        }
    }

    fn disable_persistence(&self, err: &StorageError) {
        warn!(
            ?err,
            "Booking selection storage unavailable, keeping selections in memory only"
        );
        self.persistence_enabled.store(false, Ordering::SeqCst);
    }

    fn state(&self) -> MutexGuard<'_, BookingSelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
