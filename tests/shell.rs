use std::fs;
use std::io::Cursor;
use std::path::Path;

use roomdesk::engine::Engine;
use roomdesk::model::DateFilter;
use roomdesk::shell::{OutputFormat, Shell, ShellOptions};
use tempfile::TempDir;

fn session(path: &Path, options: ShellOptions, input: &str) -> (Engine, String) {
    let mut shell = Shell::new(Engine::new(path.to_path_buf()), Vec::new(), options);
    shell.run(Cursor::new(input.to_string())).unwrap();
    let (engine, out) = shell.into_inner();
    (engine, String::from_utf8(out).unwrap())
}

fn json_lines(out: &str) -> Vec<serde_json::Value> {
    out.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

fn json() -> ShellOptions {
    ShellOptions {
        format: OutputFormat::Json,
        assume_yes: true,
    }
}

#[test]
fn bookings_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appointments.txt");

    let (_, out) = session(
        &path,
        ShellOptions::default(),
        "INSERT INTO reservations VALUES ('Ann Lee', 'MRI', 9, 11, '2024-01-01')\n\
         INSERT INTO reservations (date, room_type, patient_name, start_hour, end_hour) \
         VALUES ('2024-01-01', 'CT', 'Bo', 12, 13)\n\
         quit\n",
    );
    assert!(out.contains("Reservation booked. ID: 1"), "{out}");
    assert!(out.contains("Reservation booked. ID: 2"), "{out}");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Ann Lee|MRI|9|11|2024-01-01|1\nBo|CT|12|13|2024-01-01|2\n"
    );

    let (engine, out) = session(
        &path,
        json(),
        "SELECT * FROM reservations WHERE date = '2024-01-01'\n\
         INSERT INTO reservations VALUES ('Cy', 'MRI', 10, 12, '2024-01-01')\n\
         INSERT INTO reservations VALUES ('Cy', 'MRI', 11, 12, '2024-01-01')\n",
    );
    let lines = json_lines(&out);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["patient_name"], "Ann Lee");
    assert_eq!(lines[1]["room_type"], "CT");
    assert_eq!(lines[2]["error"], "overlap");
    assert_eq!(lines[3]["id"], 3);
    assert_eq!(engine.len(), 3);
}

#[test]
fn cancelled_ids_are_not_handed_out_again() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appointments.txt");

    session(
        &path,
        json(),
        "INSERT INTO reservations VALUES ('Ann', 'X-ray', 8, 9, '2024-03-03')\n\
         INSERT INTO reservations VALUES ('Bo', 'X-ray', 9, 10, '2024-03-03')\n\
         INSERT INTO reservations VALUES ('Cy', 'X-ray', 10, 11, '2024-03-03')\n\
         DELETE FROM reservations WHERE id = 2\n",
    );

    let (engine, out) = session(
        &path,
        json(),
        "INSERT INTO reservations VALUES ('Di', 'X-ray', 9, 10, '2024-03-03')\n",
    );
    assert_eq!(json_lines(&out)[0]["id"], 4);
    let ids: Vec<u64> = engine
        .list_by_date(&DateFilter::All)
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![1, 4, 3]);
}

#[test]
fn aborted_cancel_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appointments.txt");

    session(
        &path,
        ShellOptions::default(),
        "INSERT INTO reservations VALUES ('Ann', 'CT', 9, 10, '2024-01-01')\n",
    );
    let before = fs::read_to_string(&path).unwrap();

    let (engine, out) = session(
        &path,
        ShellOptions::default(),
        "DELETE FROM reservations WHERE id = 1\n\
         no\n",
    );
    assert!(out.contains("Cancellation aborted."), "{out}");
    assert_eq!(engine.len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn malformed_store_lines_are_skipped_at_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appointments.txt");
    fs::write(
        &path,
        "Ann|MRI|9|11|2024-01-01|4\n\
         broken line\n\
         Bo|MRI|nine|11|2024-01-01|5\n",
    )
    .unwrap();

    let (engine, out) = session(
        &path,
        json(),
        "SELECT * FROM reservations WHERE id = 4\n\
         INSERT INTO reservations VALUES ('Cy', 'MRI', 11, 12, '2024-01-01')\n",
    );
    let lines = json_lines(&out);
    assert_eq!(lines[0]["patient_name"], "Ann");
    assert_eq!(lines[1]["id"], 5);
    assert_eq!(engine.len(), 2);
}

#[test]
fn availability_queries_through_the_shell() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appointments.txt");

    let (_, out) = session(
        &path,
        json(),
        "INSERT INTO reservations VALUES ('Ann', 'CT', 9, 12, '2024-02-02')\n\
         SELECT * FROM slots WHERE room_type = 'CT' AND date = '2024-02-02'\n\
         SELECT * FROM availability WHERE room_type = 'CT' AND date = '2024-02-02' AND min_hours = 2\n",
    );
    let lines = json_lines(&out);
    let slots = lines[1]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 7);
    assert_eq!(slots[0], serde_json::json!({"start": 8, "end": 9}));
    assert_eq!(slots[1], serde_json::json!({"start": 12, "end": 13}));
    assert_eq!(lines[2]["windows"], serde_json::json!([{"start": 12, "end": 18}]));
}
