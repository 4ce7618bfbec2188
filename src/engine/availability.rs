use crate::limits::{CLOSING_HOUR, OPENING_HOUR, SLOT_HOURS};
use crate::model::*;

// ── Availability Algorithm ────────────────────────────────────────

/// Free ranges inside operating hours for one room on one date.
///
/// Operating hours minus every booked interval, merged. Empty schedule
/// yields the whole day.
pub fn free_spans(day: Option<&DaySchedule>) -> Vec<Span> {
    let open = [Span::new(OPENING_HOUR, CLOSING_HOUR)];
    let Some(day) = day else {
        return open.to_vec();
    };
    // intervals are kept sorted by start
    let booked: Vec<Span> = day.intervals.iter().map(|b| b.span).collect();
    let booked = merge_overlapping(&booked);
    subtract_intervals(&open, &booked)
}

/// Cut free ranges into fixed one-hour buckets, ascending, unmerged.
pub fn hourly_slots(free: &[Span]) -> Vec<Span> {
    free.iter()
        .flat_map(|span| {
            (span.start..span.end)
                .step_by(SLOT_HOURS as usize)
                .filter(move |h| h + SLOT_HOURS <= span.end)
                .map(|h| Span::new(h, h + SLOT_HOURS))
        })
        .collect()
}

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

/// `base` minus `to_remove`. Both must be sorted by start; `to_remove`
/// must be disjoint.
pub fn subtract_intervals(base: &[Span], to_remove: &[Span]) -> Vec<Span> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(Span::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(Span::new(current_start, current_end));
        }
    }

    result
}
