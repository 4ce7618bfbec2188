use crate::model::{Hour, ReservationId};

#[derive(Debug)]
pub enum EngineError {
    InvalidHour(Hour),
    InvalidRange { start: Hour, end: Hour },
    Overlap(ReservationId),
    NotFound(ReservationId),
    /// The id counter reached its limit; no further ids can be issued.
    IdsExhausted,
    Persistence(String),
}

impl EngineError {
    /// Short stable name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidHour(_) => "invalid_hour",
            EngineError::InvalidRange { .. } => "invalid_range",
            EngineError::Overlap(_) => "overlap",
            EngineError::NotFound(_) => "not_found",
            EngineError::IdsExhausted => "ids_exhausted",
            EngineError::Persistence(_) => "persistence",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::limits::{CLOSING_HOUR, OPENING_HOUR};
        match self {
            EngineError::InvalidHour(h) => write!(
                f,
                "hour {h} outside operating hours {OPENING_HOUR}-{CLOSING_HOUR}"
            ),
            EngineError::InvalidRange { start, end } => {
                write!(f, "start hour {start} must be before end hour {end}")
            }
            EngineError::Overlap(id) => write!(f, "time slot conflicts with reservation {id}"),
            EngineError::NotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::IdsExhausted => write!(f, "no reservation ids left to assign"),
            EngineError::Persistence(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
