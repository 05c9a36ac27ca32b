use crate::{
    backend::{CreateRecordsResponse, FitnessBackend, TrainerDetail},
    clock::Clock,
    error::{BackendError, StorageError},
    storage::{MemoryStorage, SelectionStorage},
    types::{Slot, TrainerId, TrainerSelection},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::StreamExt;
use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio_stream::wrappers::WatchStream;

pub fn slot(value: &str) -> Slot {
    value.parse().unwrap()
}

pub async fn read_from_selection_stream(
    stream: &mut WatchStream<Vec<TrainerSelection>>,
) -> Vec<TrainerSelection> {
    tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("No selections published in time")
        .expect("Selection stream closed")
}

pub struct FixedClock(Mutex<NaiveDateTime>);

impl FixedClock {
    pub fn at(now: &str) -> Self {
        Self(Mutex::new(slot(now).datetime()))
    }

    pub fn set(&self, now: &str) {
        *self.0.lock().unwrap() = slot(now).datetime();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

/// Storage whose writes always fail, as with a full disk.
#[derive(Default)]
pub struct FailingStorage {
    pub calls_to_set: AtomicU64,
}

impl SelectionStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        self.calls_to_set.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::Other, "Supposed to fail").into())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(io::Error::new(io::ErrorKind::Other, "Supposed to fail").into())
    }
}

/// Memory storage whose reads can be switched to fail.
#[derive(Default)]
pub struct UnreadableStorage {
    pub inner: MemoryStorage,
    pub fail_reads: AtomicBool,
}

impl SelectionStorage for UnreadableStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "Supposed to fail").into());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

pub struct MockFitnessBackendInner {
    pub reachable: AtomicBool,
    pub accept_records: AtomicBool,
    pub calls_to_fetch_trainer_detail: AtomicU64,
    pub calls_to_create_records: AtomicU64,
    pub booked_slots: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<(TrainerId, Vec<Slot>)>>,
}

#[derive(Clone)]
pub struct MockFitnessBackend(pub Arc<MockFitnessBackendInner>);

impl MockFitnessBackendInner {
    fn new() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            accept_records: AtomicBool::new(true),
            calls_to_fetch_trainer_detail: AtomicU64::default(),
            calls_to_create_records: AtomicU64::default(),
            booked_slots: Mutex::default(),
            submitted: Mutex::default(),
        }
    }
}

impl MockFitnessBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockFitnessBackendInner::new()))
    }

    fn check_reachable(&self, url: &str) -> Result<(), BackendError> {
        match self.0.reachable.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::UnexpectedStatus {
                status: 503,
                url: url.into(),
            }),
        }
    }
}

#[async_trait]
impl FitnessBackend for MockFitnessBackend {
    async fn fetch_trainer_detail(
        &self,
        trainer_id: TrainerId,
    ) -> Result<TrainerDetail, BackendError> {
        self.0
            .calls_to_fetch_trainer_detail
            .fetch_add(1, Ordering::SeqCst);
        self.check_reachable("/api/trainers/")?;

        Ok(TrainerDetail {
            id: trainer_id,
            booked_slots: self.0.booked_slots.lock().unwrap().clone(),
        })
    }

    async fn create_records(
        &self,
        trainer_id: TrainerId,
        time_slots: &[Slot],
    ) -> Result<CreateRecordsResponse, BackendError> {
        self.0.calls_to_create_records.fetch_add(1, Ordering::SeqCst);
        self.check_reachable("/api/records/create/")?;
        self.0
            .submitted
            .lock()
            .unwrap()
            .push((trainer_id, time_slots.to_vec()));

        if self.0.accept_records.load(Ordering::SeqCst) {
            Ok(CreateRecordsResponse {
                success: true,
                message: Some(format!("Records created: {}", time_slots.len())),
                error: None,
                errors: None,
            })
        } else {
            Ok(CreateRecordsResponse {
                success: false,
                message: None,
                error: Some("No records could be created".into()),
                errors: Some(
                    time_slots
                        .iter()
                        .map(|slot| format!("Slot already taken: {slot}"))
                        .collect(),
                ),
            })
        }
    }
}
