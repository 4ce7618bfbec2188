use std::time::{Duration, Instant};

use roomdesk::engine::Engine;
use roomdesk::limits::{CLOSING_HOUR, KNOWN_ROOMS, OPENING_HOUR};
use roomdesk::model::DateFilter;
use tempfile::TempDir;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.3}ms, p50={:.3}ms, p95={:.3}ms, p99={:.3}ms, max={:.3}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

fn date(day: usize) -> String {
    format!("2024-{:02}-{:02}", 1 + day / 28, 1 + day % 28)
}

/// Fill `days` worth of one-hour bookings in every known room. Each booking
/// rewrites the whole file, so latency grows with the set.
fn phase1_fill(engine: &mut Engine, days: usize) {
    let mut latencies = Vec::new();
    let start = Instant::now();

    for day in 0..days {
        let d = date(day);
        for room in KNOWN_ROOMS {
            for h in OPENING_HOUR..CLOSING_HOUR {
                let t = Instant::now();
                engine.book("bench", room, h, h + 1, &d).unwrap();
                latencies.push(t.elapsed());
            }
        }
    }

    let elapsed = start.elapsed();
    let n = latencies.len();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!("  {n} bookings in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("book latency", &mut latencies);
}

fn phase2_conflicts(engine: &mut Engine, days: usize) {
    let mut latencies = Vec::new();
    let mut rejected = 0;

    for day in 0..days {
        let d = date(day);
        for room in KNOWN_ROOMS {
            let t = Instant::now();
            if engine.book("bench", room, 10, 12, &d).is_err() {
                rejected += 1;
            }
            latencies.push(t.elapsed());
        }
    }

    println!("  {rejected}/{} rejected as overlapping", latencies.len());
    print_latency("rejected book latency", &mut latencies);
}

fn phase3_reads(engine: &Engine, days: usize) {
    let mut slot_latencies = Vec::new();
    let mut list_latencies = Vec::new();

    for day in 0..days {
        let d = date(day);
        for room in KNOWN_ROOMS {
            let t = Instant::now();
            let _ = engine.available_slots(room, &d);
            slot_latencies.push(t.elapsed());
        }
        let t = Instant::now();
        let _ = engine.list_by_date(&DateFilter::On(d));
        list_latencies.push(t.elapsed());
    }

    print_latency("available_slots", &mut slot_latencies);
    print_latency("list_by_date", &mut list_latencies);
}

fn phase4_cancel(engine: &mut Engine) {
    let ids: Vec<u64> = engine.reservations().iter().map(|r| r.id).step_by(2).collect();
    let mut latencies = Vec::with_capacity(ids.len());

    for id in ids {
        let t = Instant::now();
        engine.cancel(id).unwrap();
        latencies.push(t.elapsed());
    }

    print_latency("cancel latency", &mut latencies);
}

fn phase5_reload(dir: &TempDir) {
    let t = Instant::now();
    let engine = Engine::new(dir.path().join("appointments.txt"));
    println!(
        "  loaded {} reservations in {:.2}ms",
        engine.len(),
        t.elapsed().as_secs_f64() * 1000.0
    );
}

fn main() {
    let days: usize = std::env::var("ROOMDESK_BENCH_DAYS")
        .unwrap_or_else(|_| "20".into())
        .parse()
        .expect("invalid ROOMDESK_BENCH_DAYS");

    let dir = TempDir::new().expect("tempdir");
    let mut engine = Engine::new(dir.path().join("appointments.txt"));

    println!("=== roomdesk stress benchmark ===");
    println!("store: {}\n", engine.store().path().display());

    println!("[phase 1] sequential bookings");
    phase1_fill(&mut engine, days);

    println!("\n[phase 2] overlapping bookings");
    phase2_conflicts(&mut engine, days);

    println!("\n[phase 3] read latency");
    phase3_reads(&engine, days);

    println!("\n[phase 4] cancellations");
    phase4_cancel(&mut engine);

    println!("\n[phase 5] reload from disk");
    phase5_reload(&dir);

    println!("\n=== benchmark complete ===");
}
