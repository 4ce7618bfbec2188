use crate::limits::{CLOSING_HOUR, OPENING_HOUR};
use crate::model::*;

use super::EngineError;

/// Both hours inside operating hours, then `start < end`.
pub(crate) fn validate_hours(start: Hour, end: Hour) -> Result<Span, EngineError> {
    for hour in [start, end] {
        if !(OPENING_HOUR..=CLOSING_HOUR).contains(&hour) {
            return Err(EngineError::InvalidHour(hour));
        }
    }
    if start >= end {
        return Err(EngineError::InvalidRange { start, end });
    }
    Ok(Span::new(start, end))
}

/// Reject `span` if it intersects any booking already on this day schedule.
/// Reports the earliest-starting conflict.
pub(crate) fn check_no_conflict(day: Option<&DaySchedule>, span: &Span) -> Result<(), EngineError> {
    let Some(day) = day else { return Ok(()) };
    match day.overlapping(span).next() {
        Some(existing) => Err(EngineError::Overlap(existing.id)),
        None => Ok(()),
    }
}
