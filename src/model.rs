use serde::{Deserialize, Serialize};

use crate::limits::ALL_DATES;

/// Hour of day on a 24-hour clock.
pub type Hour = i32;

/// Reservation identifier. Positive, assigned by the engine, never reused.
pub type ReservationId = u64;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Hour,
    pub end: Hour,
}

impl Span {
    pub fn new(start: Hour, end: Hour) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn hours(&self) -> Hour {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_hour(&self, h: Hour) -> bool {
        self.start <= h && h < self.end
    }
}

/// A booked interval for one room on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub patient_name: String,
    pub room_type: String,
    pub date: String,
    pub start_hour: Hour,
    pub end_hour: Hour,
}

impl Reservation {
    pub fn span(&self) -> Span {
        Span::new(self.start_hour, self.end_hour)
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.room_type, &self.date)
    }
}

/// `(room_type, date)`: each key is an independent overlap domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub room_type: String,
    pub date: String,
}

impl ResourceKey {
    pub fn new(room_type: &str, date: &str) -> Self {
        Self {
            room_type: room_type.to_string(),
            date: date.to_string(),
        }
    }
}

/// A reservation's footprint inside a [`DaySchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booked {
    pub id: ReservationId,
    pub span: Span,
}

/// Every booking for one room on one date.
#[derive(Debug, Clone, Default)]
pub struct DaySchedule {
    /// Sorted by `span.start`. Never overlapping once admitted by the engine.
    pub intervals: Vec<Booked>,
}

impl DaySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert interval maintaining sort order by span.start.
    pub fn insert_interval(&mut self, booked: Booked) {
        let pos = self
            .intervals
            .binary_search_by_key(&booked.span.start, |b| b.span.start)
            .unwrap_or_else(|e| e);
        self.intervals.insert(pos, booked);
    }

    /// Remove interval by id.
    pub fn remove_interval(&mut self, id: ReservationId) -> Option<Booked> {
        let pos = self.intervals.iter().position(|b| b.id == id)?;
        Some(self.intervals.remove(pos))
    }

    /// Return only intervals whose span overlaps the query window.
    /// Uses binary search to skip intervals starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Booked> {
        let right_bound = self
            .intervals
            .partition_point(|b| b.span.start < query.end);
        self.intervals[..right_bound]
            .iter()
            .filter(move |b| b.span.end > query.start)
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Which reservations `list_by_date` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    All,
    On(String),
}

impl DateFilter {
    pub fn matches(&self, date: &str) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::On(d) => d == date,
        }
    }
}

impl From<&str> for DateFilter {
    fn from(s: &str) -> Self {
        if s == ALL_DATES {
            DateFilter::All
        } else {
            DateFilter::On(s.to_string())
        }
    }
}

/// Render an hour the way the front desk reads it: `9:00 AM`, `12:00 PM`.
pub fn format_hour(hour: Hour) -> String {
    match hour {
        0 => "12:00 AM".to_string(),
        12 => "12:00 PM".to_string(),
        h if h > 12 => format!("{}:00 PM", h - 12),
        h => format!("{h}:00 AM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booked(id: ReservationId, start: Hour, end: Hour) -> Booked {
        Booked {
            id,
            span: Span::new(start, end),
        }
    }

    #[test]
    fn span_basics() {
        let s = Span::new(9, 12);
        assert_eq!(s.hours(), 3);
        assert!(s.contains_hour(9));
        assert!(s.contains_hour(11));
        assert!(!s.contains_hour(12)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(9, 11);
        let b = Span::new(10, 12);
        let c = Span::new(11, 13);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn interval_ordering() {
        let mut day = DaySchedule::new();
        day.insert_interval(booked(1, 14, 15));
        day.insert_interval(booked(2, 8, 9));
        day.insert_interval(booked(3, 10, 12));
        let starts: Vec<Hour> = day.intervals.iter().map(|b| b.span.start).collect();
        assert_eq!(starts, vec![8, 10, 14]);
    }

    #[test]
    fn remove_middle_preserves_order() {
        let mut day = DaySchedule::new();
        for (i, id) in (1..=3).enumerate() {
            let start = 8 + 2 * i as Hour;
            day.insert_interval(booked(id, start, start + 1));
        }
        assert_eq!(day.remove_interval(2).map(|b| b.id), Some(2));
        let ids: Vec<ReservationId> = day.intervals.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn remove_nonexistent_returns_none() {
        let mut day = DaySchedule::new();
        day.insert_interval(booked(1, 9, 10));
        assert!(day.remove_interval(7).is_none());
        assert_eq!(day.intervals.len(), 1);
    }

    #[test]
    fn overlapping_skips_before_and_after() {
        let mut day = DaySchedule::new();
        day.insert_interval(booked(1, 8, 9));
        day.insert_interval(booked(2, 10, 12));
        day.insert_interval(booked(3, 15, 17));

        let hits: Vec<_> = day.overlapping(&Span::new(11, 14)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn overlapping_adjacent_not_included() {
        let mut day = DaySchedule::new();
        day.insert_interval(booked(1, 9, 11));
        assert_eq!(day.overlapping(&Span::new(11, 13)).count(), 0);
        assert_eq!(day.overlapping(&Span::new(8, 9)).count(), 0);
    }

    #[test]
    fn overlapping_whole_day_interval() {
        let mut day = DaySchedule::new();
        day.insert_interval(booked(1, 8, 18));
        assert_eq!(day.overlapping(&Span::new(13, 14)).count(), 1);
    }

    #[test]
    fn date_filter_from_sentinel() {
        assert_eq!(DateFilter::from("all"), DateFilter::All);
        assert_eq!(
            DateFilter::from("2024-01-01"),
            DateFilter::On("2024-01-01".into())
        );
        // exact match only
        assert_eq!(DateFilter::from("ALL"), DateFilter::On("ALL".into()));
        assert!(DateFilter::On("2024-01-01".into()).matches("2024-01-01"));
        assert!(!DateFilter::On("2024-01-01".into()).matches("2024-01-02"));
        assert!(DateFilter::All.matches("anything"));
    }

    #[test]
    fn format_hour_twelve_hour_clock() {
        assert_eq!(format_hour(8), "8:00 AM");
        assert_eq!(format_hour(12), "12:00 PM");
        assert_eq!(format_hour(13), "1:00 PM");
        assert_eq!(format_hour(18), "6:00 PM");
        assert_eq!(format_hour(0), "12:00 AM");
    }

    #[test]
    fn reservation_json_shape() {
        let r = Reservation {
            id: 4,
            patient_name: "Ann".into(),
            room_type: "MRI".into(),
            date: "2024-01-01".into(),
            start_hour: 9,
            end_hour: 11,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["room_type"], "MRI");
        assert_eq!(json["start_hour"], 9);
        let back: Reservation = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
