use crate::model::*;

use super::availability::{free_spans, hourly_slots};
use super::{Engine, EngineError};

impl Engine {
    pub fn find(&self, id: ReservationId) -> Result<&Reservation, EngineError> {
        self.reservations
            .iter()
            .find(|r| r.id == id)
            .ok_or(EngineError::NotFound(id))
    }

    /// Reservations matching `filter`, sorted by `(date, start_hour)`.
    /// Ties keep insertion order.
    pub fn list_by_date(&self, filter: &DateFilter) -> Vec<Reservation> {
        let mut listed: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| filter.matches(&r.date))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.date.cmp(&b.date).then(a.start_hour.cmp(&b.start_hour)));
        listed
    }

    /// Free one-hour buckets `[h, h+1)` within operating hours for this room
    /// and date, ascending. Adjacent free buckets are reported separately.
    pub fn available_slots(&self, room_type: &str, date: &str) -> Vec<Span> {
        hourly_slots(&self.available_windows(room_type, date, None))
    }

    /// Maximal free ranges within operating hours, optionally keeping only
    /// those at least `min_hours` long.
    pub fn available_windows(&self, room_type: &str, date: &str, min_hours: Option<Hour>) -> Vec<Span> {
        let key = ResourceKey::new(room_type, date);
        let mut free = free_spans(self.index.day(&key));
        if let Some(min) = min_hours {
            free.retain(|span| span.hours() >= min);
        }
        free
    }

    /// Room types that currently hold at least one reservation.
    pub fn rooms(&self) -> Vec<String> {
        self.index.rooms()
    }

    /// All reservations in insertion order.
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// Id the next successful `book` will return.
    pub fn next_id(&self) -> ReservationId {
        self.next_id
    }
}
