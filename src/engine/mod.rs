mod availability;
mod conflict;
mod error;
mod index;
mod mutations;
mod queries;

pub use availability::{free_spans, hourly_slots, merge_overlapping, subtract_intervals};
pub use error::EngineError;
pub use index::ScheduleIndex;

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::model::*;
use crate::observability::*;
use crate::store::{Snapshot, Store};

/// Result of a mutation that was applied in memory.
///
/// `persist_error` is set when the follow-up save failed. The mutation still
/// stands; the file on disk is stale until the next successful save.
#[derive(Debug)]
pub struct Committed<T> {
    pub value: T,
    pub persist_error: Option<EngineError>,
}

impl<T> Committed<T> {
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Owns the reservation set. Every mutation ends with a synchronous save of
/// the full set.
pub struct Engine {
    store: Store,
    /// Insertion order; this is also the on-disk order.
    reservations: Vec<Reservation>,
    index: ScheduleIndex,
    next_id: ReservationId,
}

impl Engine {
    /// Open the store file at `data_file` and load it.
    pub fn new(data_file: PathBuf) -> Self {
        Self::open(Store::new(data_file))
    }

    /// Load `store` into a new engine. A store that cannot be read yields an
    /// empty engine.
    ///
    /// Stored records that fail the hour, range or overlap rules, or repeat an
    /// id, are dropped from memory only. The file still holds them until the
    /// next successful save, which removes them for good.
    pub fn open(store: Store) -> Self {
        let snapshot = match store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %store.path().display(), "could not read store, starting empty: {e}");
                Snapshot::empty()
            }
        };
        if snapshot.skipped > 0 {
            warn!(skipped = snapshot.skipped, "skipped malformed records");
            metrics::counter!(STORE_RECORDS_SKIPPED_TOTAL).increment(snapshot.skipped as u64);
        }

        let mut engine = Self {
            store,
            reservations: Vec::with_capacity(snapshot.reservations.len()),
            index: ScheduleIndex::new(),
            next_id: snapshot.next_id,
        };

        // Records are re-checked against the same rules as `book`; `next_id`
        // still counts the ones dropped here.
        for r in snapshot.reservations {
            if engine.index.contains(r.id) {
                warn!(id = r.id, "dropping stored reservation: duplicate id");
                continue;
            }
            if let Err(e) = engine.admit(&r) {
                warn!(id = r.id, "dropping stored reservation: {e}");
                continue;
            }
            engine.index.insert(&r);
            engine.reservations.push(r);
        }

        info!(
            path = %engine.store.path().display(),
            reservations = engine.reservations.len(),
            next_id = engine.next_id,
            "reservations loaded"
        );
        metrics::gauge!(RESERVATIONS_ACTIVE).set(engine.reservations.len() as f64);
        engine
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Hour bounds and overlap check for a record that already carries an id.
    fn admit(&self, r: &Reservation) -> Result<(), EngineError> {
        let span = conflict::validate_hours(r.start_hour, r.end_hour)?;
        conflict::check_no_conflict(self.index.day(&r.key()), &span)
    }

    /// Save the full set. Failures are logged and handed back, never raised.
    fn persist(&self) -> Option<EngineError> {
        let start = Instant::now();
        let result = self.store.save(&self.reservations);
        metrics::histogram!(STORE_SAVE_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
        metrics::gauge!(RESERVATIONS_ACTIVE).set(self.reservations.len() as f64);
        match result {
            Ok(()) => None,
            Err(e) => {
                warn!(path = %self.store.path().display(), "could not save reservations: {e}");
                metrics::counter!(STORE_SAVE_FAILURES_TOTAL).increment(1);
                Some(EngineError::Persistence(e.to_string()))
            }
        }
    }

    fn commit<T>(&self, value: T) -> Committed<T> {
        Committed {
            value,
            persist_error: self.persist(),
        }
    }
}
