use tracing::debug;

use crate::model::*;
use crate::observability::BOOKING_REJECTIONS_TOTAL;

use super::conflict::{check_no_conflict, validate_hours};
use super::{Committed, Engine, EngineError};

impl Engine {
    /// Book `[start_hour, end_hour)` in `room_type` on `date` and return the
    /// new reservation id.
    ///
    /// Checks run in order: hour bounds, range, overlap with the same room and
    /// date, id counter. Touching intervals do not overlap.
    pub fn book(
        &mut self,
        patient_name: &str,
        room_type: &str,
        start_hour: Hour,
        end_hour: Hour,
        date: &str,
    ) -> Result<Committed<ReservationId>, EngineError> {
        let key = ResourceKey::new(room_type, date);
        let checked = validate_hours(start_hour, end_hour)
            .and_then(|span| check_no_conflict(self.index.day(&key), &span))
            .and_then(|()| self.next_id.checked_add(1).ok_or(EngineError::IdsExhausted));
        let next_id = match checked {
            Ok(next) => next,
            Err(e) => {
                metrics::counter!(BOOKING_REJECTIONS_TOTAL, "reason" => e.kind()).increment(1);
                return Err(e);
            }
        };

        let id = self.next_id;
        self.next_id = next_id;
        let reservation = Reservation {
            id,
            patient_name: patient_name.to_string(),
            room_type: key.room_type,
            date: key.date,
            start_hour,
            end_hour,
        };
        self.index.insert(&reservation);
        self.reservations.push(reservation);
        debug!(id, room_type, date, start_hour, end_hour, "reservation booked");

        Ok(self.commit(id))
    }

    /// Delete reservation `id` and persist. Removing an id that is not
    /// present (including one removed earlier) is `NotFound`.
    pub fn remove(&mut self, id: ReservationId) -> Result<Committed<Reservation>, EngineError> {
        let pos = self
            .reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::NotFound(id))?;
        let removed = self.reservations.remove(pos);
        self.index.remove(id);
        debug!(id, room_type = %removed.room_type, date = %removed.date, "reservation removed");

        Ok(self.commit(removed))
    }

    /// `find` then `remove`, for callers with no confirmation step in between.
    pub fn cancel(&mut self, id: ReservationId) -> Result<Committed<Reservation>, EngineError> {
        self.find(id)?;
        self.remove(id)
    }
}
