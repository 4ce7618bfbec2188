use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::limits::FIELD_SEPARATOR;
use crate::model::*;

const FIELD_COUNT: usize = 6;

/// Encode a single reservation as `name|room|start|end|date|id\n`.
fn encode_record(writer: &mut impl Write, r: &Reservation) -> io::Result<()> {
    let sep = FIELD_SEPARATOR;
    writeln!(
        writer,
        "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
        r.patient_name, r.room_type, r.start_hour, r.end_hour, r.date, r.id
    )
}

/// Decode one line. `None` means the line is malformed and should be skipped.
fn decode_record(line: &str) -> Option<Reservation> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [name, room, start, end, date, id] = fields.as_slice() else {
        return None;
    };
    let start_hour: Hour = start.trim().parse().ok()?;
    let end_hour: Hour = end.trim().parse().ok()?;
    let id: ReservationId = id.trim().parse().ok()?;
    // 0 is never issued; MAX would leave no room for `next_id`
    if id == 0 || id == ReservationId::MAX {
        return None;
    }
    Some(Reservation {
        id,
        patient_name: name.to_string(),
        room_type: room.to_string(),
        date: date.to_string(),
        start_hour,
        end_hour,
    })
}

/// Everything `load` recovered from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Well-formed records in file order.
    pub reservations: Vec<Reservation>,
    /// `1 + max(id)` over `reservations`, or 1 when empty.
    pub next_id: ReservationId,
    /// Lines dropped as malformed.
    pub skipped: usize,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            reservations: Vec::new(),
            next_id: 1,
            skipped: 0,
        }
    }
}

/// Plain-text snapshot file, one record per line:
/// `name|roomType|startHour|endHour|date|id`.
///
/// - No header, no escaping, decimal integers.
/// - `save` rewrites the whole file in place. There is no rename step, so a
///   crash mid-save can leave a truncated file; the next `load` skips the
///   damaged tail line.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every well-formed record. A missing file is an empty store.
    pub fn load(&self) -> io::Result<Snapshot> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::empty()),
            Err(e) => return Err(e),
        };
        let reader = BufReader::new(file);
        let mut snapshot = Snapshot::empty();
        let mut max_id: ReservationId = 0;

        for (lineno, raw) in reader.split(b'\n').enumerate() {
            let raw = raw?;
            let Ok(line) = std::str::from_utf8(&raw) else {
                debug!(line = lineno + 1, "skipping record: not UTF-8");
                snapshot.skipped += 1;
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            match decode_record(line) {
                Some(r) => {
                    max_id = max_id.max(r.id);
                    snapshot.reservations.push(r);
                }
                None => {
                    debug!(line = lineno + 1, "skipping malformed record");
                    snapshot.skipped += 1;
                }
            }
        }

        snapshot.next_id = max_id.checked_add(1).unwrap_or(ReservationId::MAX);
        Ok(snapshot)
    }

    /// Overwrite the file with `reservations`, in the order given.
    pub fn save(&self, reservations: &[Reservation]) -> io::Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        for r in reservations {
            encode_record(&mut writer, r)?;
        }
        writer.flush()
    }
}
