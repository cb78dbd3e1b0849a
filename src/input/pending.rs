use crate::prompt::GenerationRequest;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PendingInput {
    request: GenerationRequest,
    submitted_at: DateTime<Utc>,
}

/// Submissions waiting for their event stream, keyed by a one-shot stream id.
pub struct PendingInputs {
    entries: Mutex<HashMap<Uuid, PendingInput>>,
    ttl: chrono::Duration,
    capacity: usize,
}

impl PendingInputs {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52)),
            capacity: capacity.max(1),
        }
    }

    pub fn submit(&self, request: GenerationRequest) -> Uuid {
        self.submit_at(request, Utc::now())
    }

    /// Removes and returns the submission; unknown and expired ids yield `None`.
    pub fn take(&self, id: &Uuid) -> Option<GenerationRequest> {
        self.take_at(id, Utc::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn submit_at(&self, request: GenerationRequest, now: DateTime<Utc>) -> Uuid {
        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, entry| now - entry.submitted_at <= self.ttl);
        if entries.len() < before {
            debug!("Purged {} expired submissions", before - entries.len());
        }

        while entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.submitted_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    debug!("Evicting submission {} at capacity", id);
                    entries.remove(&id);
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        entries.insert(
            id,
            PendingInput {
                request,
                submitted_at: now,
            },
        );
        id
    }

    fn take_at(&self, id: &Uuid, now: DateTime<Utc>) -> Option<GenerationRequest> {
        let entry = self.lock().remove(id)?;
        (now - entry.submitted_at <= self.ttl).then_some(entry.request)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PendingInput>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
