use std::collections::HashMap;

use crate::model::*;

/// Per-(room, date) schedules plus a reverse id → key lookup.
#[derive(Debug, Default)]
pub struct ScheduleIndex {
    days: HashMap<ResourceKey, DaySchedule>,
    entity_to_key: HashMap<ReservationId, ResourceKey>,
}

impl ScheduleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Day schedules ────────────────────────────────────────

    pub fn day(&self, key: &ResourceKey) -> Option<&DaySchedule> {
        self.days.get(key)
    }

    // ── Entity index ─────────────────────────────────────────

    pub fn contains(&self, id: ReservationId) -> bool {
        self.entity_to_key.contains_key(&id)
    }

    // ── Mutation ─────────────────────────────────────────────

    pub fn insert(&mut self, r: &Reservation) {
        let key = r.key();
        self.days.entry(key.clone()).or_default().insert_interval(Booked {
            id: r.id,
            span: r.span(),
        });
        self.entity_to_key.insert(r.id, key);
    }

    /// Drop `id` from its day; empty days are removed so the map only holds
    /// keys with bookings.
    pub fn remove(&mut self, id: ReservationId) -> Option<Booked> {
        let key = self.entity_to_key.remove(&id)?;
        let day = self.days.get_mut(&key)?;
        let removed = day.remove_interval(id);
        if day.is_empty() {
            self.days.remove(&key);
        }
        removed
    }

    /// Room types with at least one booking on any date, sorted, deduplicated.
    pub fn rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self.days.keys().map(|k| k.room_type.clone()).collect();
        rooms.sort();
        rooms.dedup();
        rooms
    }
}
