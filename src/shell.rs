use std::io::{self, BufRead, Write};
use std::time::Instant;

use serde_json::json;
use tracing::debug;

use crate::engine::{Engine, EngineError};
use crate::limits::{CLOSING_HOUR, KNOWN_ROOMS, OPENING_HOUR};
use crate::model::*;
use crate::observability::{command_label, COMMANDS_TOTAL, COMMAND_DURATION_SECONDS};
use crate::sql::{self, Command, SqlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    pub format: OutputFormat,
    /// Skip the y/n prompt before a cancellation.
    pub assume_yes: bool,
}

#[derive(Debug)]
pub enum ShellError {
    Io(io::Error),
    Sql(SqlError),
    Engine(EngineError),
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::Sql(e) => write!(f, "{e}"),
            ShellError::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::Io(e)
    }
}

impl From<SqlError> for ShellError {
    fn from(e: SqlError) -> Self {
        ShellError::Sql(e)
    }
}

impl From<EngineError> for ShellError {
    fn from(e: EngineError) -> Self {
        ShellError::Engine(e)
    }
}

impl ShellError {
    fn kind(&self) -> &'static str {
        match self {
            ShellError::Io(_) => "io",
            ShellError::Sql(_) => "sql",
            ShellError::Engine(e) => e.kind(),
        }
    }
}

/// What a command produced, before rendering.
#[derive(Debug)]
pub enum Response {
    Booked {
        id: ReservationId,
        warning: Option<EngineError>,
    },
    Cancelled {
        reservation: Reservation,
        warning: Option<EngineError>,
    },
    Aborted {
        id: ReservationId,
    },
    Found(Reservation),
    Reservations(Vec<Reservation>),
    Slots {
        room_type: String,
        date: String,
        slots: Vec<Span>,
    },
    Windows {
        room_type: String,
        date: String,
        windows: Vec<Span>,
    },
}

/// Line-oriented front desk: one SQL statement per input line.
pub struct Shell<W: Write> {
    engine: Engine,
    out: W,
    options: ShellOptions,
}

impl<W: Write> Shell<W> {
    pub fn new(engine: Engine, out: W, options: ShellOptions) -> Self {
        Self { engine, out, options }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_inner(self) -> (Engine, W) {
        (self.engine, self.out)
    }

    /// Process statements until EOF or `quit`. Command failures are printed
    /// and the loop continues; only I/O errors end it early.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<()> {
        if self.options.format == OutputFormat::Text {
            self.print_banner()?;
        }
        let mut lines = input.lines();
        while let Some(line) = lines.next() {
            let line = line?;
            let stmt = line.trim();
            if stmt.is_empty() || stmt.starts_with("--") {
                continue;
            }
            match stmt.trim_end_matches(';').to_lowercase().as_str() {
                "quit" | "exit" | "\\q" => break,
                "help" => {
                    self.print_banner()?;
                    continue;
                }
                _ => {}
            }
            self.handle_statement(stmt, &mut lines)?;
        }
        self.out.flush()
    }

    fn handle_statement(
        &mut self,
        stmt: &str,
        answers: &mut impl Iterator<Item = io::Result<String>>,
    ) -> io::Result<()> {
        let start = Instant::now();
        let (label, result) = match sql::parse_sql(stmt) {
            Ok(cmd) => {
                let label = command_label(&cmd);
                (label, self.execute(cmd, answers))
            }
            Err(e) => ("unparsed", Err(ShellError::Sql(e))),
        };
        metrics::histogram!(COMMAND_DURATION_SECONDS, "command" => label)
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                metrics::counter!(COMMANDS_TOTAL, "command" => label, "status" => "ok").increment(1);
                self.render(&response)
            }
            Err(ShellError::Io(e)) => Err(e),
            Err(e) => {
                debug!(command = label, "command failed: {e}");
                metrics::counter!(COMMANDS_TOTAL, "command" => label, "status" => e.kind()).increment(1);
                self.render_error(&e)
            }
        }
    }

    /// Run one command against the engine.
    pub fn execute(
        &mut self,
        cmd: Command,
        answers: &mut impl Iterator<Item = io::Result<String>>,
    ) -> Result<Response, ShellError> {
        match cmd {
            Command::Book {
                patient_name,
                room_type,
                start_hour,
                end_hour,
                date,
            } => {
                let committed = self
                    .engine
                    .book(&patient_name, &room_type, start_hour, end_hour, &date)?;
                Ok(Response::Booked {
                    id: committed.value,
                    warning: committed.persist_error,
                })
            }
            Command::Cancel { id } => {
                let found = self.engine.find(id)?.clone();
                if !self.options.assume_yes && !self.confirm(&found, answers)? {
                    return Ok(Response::Aborted { id });
                }
                let committed = self.engine.remove(id)?;
                Ok(Response::Cancelled {
                    reservation: committed.value,
                    warning: committed.persist_error,
                })
            }
            Command::Find { id } => Ok(Response::Found(self.engine.find(id)?.clone())),
            Command::List { filter } => Ok(Response::Reservations(self.engine.list_by_date(&filter))),
            Command::Slots { room_type, date } => {
                let slots = self.engine.available_slots(&room_type, &date);
                Ok(Response::Slots { room_type, date, slots })
            }
            Command::Windows {
                room_type,
                date,
                min_hours,
            } => {
                let windows = self.engine.available_windows(&room_type, &date, min_hours);
                Ok(Response::Windows {
                    room_type,
                    date,
                    windows,
                })
            }
        }
    }

    /// Ask before removing. The answer is the next input line; EOF means no.
    /// JSON clients get a `confirm` object and must reply with that line.
    fn confirm(
        &mut self,
        r: &Reservation,
        answers: &mut impl Iterator<Item = io::Result<String>>,
    ) -> io::Result<bool> {
        match self.options.format {
            OutputFormat::Text => {
                writeln!(
                    self.out,
                    "Cancelling reservation for: {} ({} room on {})",
                    r.patient_name, r.room_type, r.date
                )?;
                write!(self.out, "Are you sure? (y/n): ")?;
            }
            OutputFormat::Json => self.write_json(&json!({
                "status": "confirm",
                "id": r.id,
                "reservation": r,
                "answer": "y/n",
            }))?,
        }
        self.out.flush()?;
        let answer = answers.next().transpose()?.unwrap_or_default();
        let yes = matches!(answer.trim().chars().next(), Some('y' | 'Y'));
        if self.options.format == OutputFormat::Text {
            writeln!(self.out)?;
        }
        Ok(yes)
    }

    // ── Rendering ─────────────────────────────────────────────

    fn render(&mut self, response: &Response) -> io::Result<()> {
        match self.options.format {
            OutputFormat::Text => self.render_text(response),
            OutputFormat::Json => self.render_json(response),
        }
    }

    fn render_text(&mut self, response: &Response) -> io::Result<()> {
        match response {
            Response::Booked { id, warning } => {
                writeln!(self.out, "Reservation booked. ID: {id}")?;
                self.render_warning(warning.as_ref())
            }
            Response::Cancelled { reservation, warning } => {
                writeln!(self.out, "Reservation {} cancelled.", reservation.id)?;
                self.render_warning(warning.as_ref())
            }
            Response::Aborted { .. } => writeln!(self.out, "Cancellation aborted."),
            Response::Found(r) => self.render_table(std::slice::from_ref(r)),
            Response::Reservations(rs) => self.render_table(rs),
            Response::Slots { room_type, date, slots } => {
                writeln!(self.out, "Available slots for {room_type} room on {date}:")?;
                self.render_spans(slots)
            }
            Response::Windows { room_type, date, windows } => {
                writeln!(self.out, "Free windows for {room_type} room on {date}:")?;
                self.render_spans(windows)
            }
        }
    }

    fn render_table(&mut self, rows: &[Reservation]) -> io::Result<()> {
        if rows.is_empty() {
            return writeln!(self.out, "No reservations found.");
        }
        writeln!(
            self.out,
            "{:>5}{:>20}{:>10}{:>12}{:>22}",
            "ID", "Patient", "Room", "Date", "Time"
        )?;
        writeln!(self.out, "{}", "-".repeat(69))?;
        for r in rows {
            let time = format!("{}-{}", format_hour(r.start_hour), format_hour(r.end_hour));
            writeln!(
                self.out,
                "{:>5}{:>20}{:>10}{:>12}{:>22}",
                r.id, r.patient_name, r.room_type, r.date, time
            )?;
        }
        Ok(())
    }

    fn render_spans(&mut self, spans: &[Span]) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(40))?;
        if spans.is_empty() {
            return writeln!(self.out, "No available slots for this room on this date.");
        }
        for s in spans {
            writeln!(self.out, "{} - {}", format_hour(s.start), format_hour(s.end))?;
        }
        Ok(())
    }

    fn render_warning(&mut self, warning: Option<&EngineError>) -> io::Result<()> {
        match warning {
            Some(e) => writeln!(self.out, "warning: {e} (change kept in memory)"),
            None => Ok(()),
        }
    }

    fn render_json(&mut self, response: &Response) -> io::Result<()> {
        let warning = |w: &Option<EngineError>| w.as_ref().map(|e| e.to_string());
        match response {
            Response::Booked { id, warning: w } => {
                self.write_json(&json!({"status": "booked", "id": id, "warning": warning(w)}))
            }
            Response::Cancelled { reservation, warning: w } => self.write_json(&json!({
                "status": "cancelled",
                "reservation": reservation,
                "warning": warning(w),
            })),
            Response::Aborted { id } => self.write_json(&json!({"status": "aborted", "id": id})),
            Response::Found(r) => self.write_json(&json!(r)),
            Response::Reservations(rs) => {
                for r in rs {
                    self.write_json(&json!(r))?;
                }
                Ok(())
            }
            Response::Slots { room_type, date, slots } => self.write_json(&json!({
                "room_type": room_type,
                "date": date,
                "slots": slots,
            })),
            Response::Windows { room_type, date, windows } => self.write_json(&json!({
                "room_type": room_type,
                "date": date,
                "windows": windows,
            })),
        }
    }

    fn write_json(&mut self, value: &serde_json::Value) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }

    fn render_error(&mut self, e: &ShellError) -> io::Result<()> {
        match self.options.format {
            OutputFormat::Text => writeln!(self.out, "error: {e}"),
            OutputFormat::Json => {
                self.write_json(&json!({"error": e.kind(), "message": e.to_string()}))
            }
        }
    }

    fn print_banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "Room booking desk")?;
        writeln!(
            self.out,
            "Operating hours: {} - {}",
            format_hour(OPENING_HOUR),
            format_hour(CLOSING_HOUR)
        )?;
        writeln!(self.out, "Rooms: {}", KNOWN_ROOMS.join(", "))?;
        writeln!(self.out, "Commands (one per line, `quit` to exit):")?;
        writeln!(
            self.out,
            "  INSERT INTO reservations (patient_name, room_type, start_hour, end_hour, date) VALUES (...)"
        )?;
        writeln!(self.out, "  DELETE FROM reservations WHERE id = <id>")?;
        writeln!(self.out, "  SELECT * FROM reservations [WHERE date = 'YYYY-MM-DD' | id = <id>]")?;
        writeln!(self.out, "  SELECT * FROM slots WHERE room_type = '...' AND date = '...'")?;
        writeln!(
            self.out,
            "  SELECT * FROM availability WHERE room_type = '...' AND date = '...' [AND min_hours = <n>]"
        )
    }
}
