use crate::model::Hour;

/// First bookable hour of the day.
pub const OPENING_HOUR: Hour = 8;

/// Closing hour. Reservations may end at, but not run past, this hour.
pub const CLOSING_HOUR: Hour = 18;

/// Width of an availability bucket.
pub const SLOT_HOURS: Hour = 1;

/// Date filter sentinel that selects every reservation.
pub const ALL_DATES: &str = "all";

/// Field separator in the store file. Not escaped: names containing it
/// produce records that no longer load.
pub const FIELD_SEPARATOR: char = '|';

/// Store file used when `ROOMDESK_DATA_FILE` is unset.
pub const DEFAULT_DATA_FILE: &str = "appointments.txt";

/// Rooms advertised by the shell. The engine accepts any room name.
pub const KNOWN_ROOMS: [&str; 3] = ["X-ray", "CT", "MRI"];
