use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, TimeDelta};

use libsched::catalog::SlotCatalog;
use libsched::clock::ManualClock;
use libsched::config::Policy;
use libsched::engine::Engine;
use libsched::model::*;
use libsched::notify::NotifyHub;

const RESOURCES: usize = 50;
const USERS: usize = 400;

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
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
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

fn resource_id(i: usize) -> ResourceId {
    ResourceId::new(format!("bench-{i}"))
}

fn user_id(i: usize) -> UserId {
    UserId::new(format!("user-{i}"))
}

async fn setup() -> (Arc<Engine>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        base_day().and_hms_opt(7, 0, 0).expect("valid time"),
    ));
    // Staff users so the daily cap does not dominate the numbers.
    let engine = Arc::new(Engine::new(
        SlotCatalog::standard(),
        Policy::default(),
        clock.clone(),
        Arc::new(NotifyHub::new()),
    ));
    for i in 0..RESOURCES {
        engine
            .insert_resource(Resource {
                id: resource_id(i),
                name: format!("Bench {i}"),
                resource_type: if i % 2 == 0 {
                    ResourceType::Computer
                } else {
                    ResourceType::CollabRoom
                },
                description: String::new(),
            })
            .await
            .expect("insert resource");
    }
    for i in 0..USERS {
        engine.register_user(User {
            id: user_id(i),
            name: format!("User {i}"),
            role: UserRole::Staff,
            department: None,
        });
    }
    println!("  created {RESOURCES} resources, {USERS} users");
    (engine, clock)
}

async fn phase1_sequential(engine: &Engine) {
    let catalog = engine.catalog().clone();
    let mut latencies = Vec::new();
    let start = Instant::now();

    for day in 0..20 {
        let date = base_day() + TimeDelta::days(day);
        for r in 0..RESOURCES {
            for (s, slot) in catalog.iter().enumerate() {
                let user = user_id((r * catalog.len() + s) % USERS);
                let t = Instant::now();
                engine
                    .create_booking(&resource_id(r), &user, date, slot.label())
                    .await
                    .expect("create booking");
                latencies.push(t.elapsed());
            }
        }
    }

    let elapsed = start.elapsed();
    let n = latencies.len();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!("  {n} bookings in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("create latency", &mut latencies);
}

async fn phase2_contended(engine: Arc<Engine>) {
    let date = base_day() + TimeDelta::days(100);
    let catalog = engine.catalog().clone();
    let start = Instant::now();
    let mut handles = Vec::new();

    // Every user races for every slot of resource 0.
    for u in 0..USERS {
        let engine = engine.clone();
        let labels: Vec<String> = catalog.iter().map(|s| s.label().to_string()).collect();
        handles.push(tokio::spawn(async move {
            let mut won = 0usize;
            for label in labels {
                let out = engine
                    .create_booking(&resource_id(0), &user_id(u), date, &label)
                    .await
                    .expect("create booking");
                if out.is_accepted() {
                    won += 1;
                }
            }
            won
        }));
    }

    let mut winners = 0;
    for h in handles {
        winners += h.await.expect("task panicked");
    }

    let elapsed = start.elapsed();
    let attempts = USERS * catalog.len();
    println!(
        "  {attempts} racing attempts in {:.2}s, {winners} admitted for {} slots",
        elapsed.as_secs_f64(),
        catalog.len()
    );
    assert_eq!(winners, catalog.len(), "double booking detected");
}

async fn phase3_read_under_load(engine: Arc<Engine>) {
    let stop = Arc::new(AtomicBool::new(false));
    let catalog = engine.catalog().clone();

    let mut writer_handles = Vec::new();
    for w in 0..5usize {
        let engine = engine.clone();
        let stop = stop.clone();
        let catalog = catalog.clone();
        writer_handles.push(tokio::spawn(async move {
            let mut i = 0i64;
            while !stop.load(Ordering::Relaxed) {
                let date = base_day() + TimeDelta::days(200 + w as i64 * 10_000 + i);
                for slot in catalog.iter() {
                    let _ = engine
                        .create_booking(&resource_id(w + 1), &user_id(w), date, slot.label())
                        .await;
                }
                i += 1;
                tokio::task::yield_now().await;
            }
        }));
    }

    let n_readers = 10;
    let reads_per_reader = 500;
    let mut reader_handles = Vec::new();
    for r in 0..n_readers {
        let engine = engine.clone();
        reader_handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for i in 0..reads_per_reader {
                let date = base_day() + TimeDelta::days((i % 20) as i64);
                let t = Instant::now();
                engine
                    .slot_board(&resource_id(r % RESOURCES), date, &user_id(r))
                    .await
                    .expect("slot board");
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in reader_handles {
        all_latencies.extend(h.await.expect("reader panicked"));
    }

    stop.store(true, Ordering::Relaxed);
    for h in writer_handles {
        let _ = h.await;
    }

    print_latency("slot board", &mut all_latencies);
}

async fn phase4_sweep(engine: Arc<Engine>, clock: &ManualClock) {
    let confirmed = engine
        .list_bookings()
        .await
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count();

    // Everything from phase 1 is now past its grace period.
    clock.set(base_day().and_hms_opt(23, 0, 0).expect("valid time") + TimeDelta::days(30));
    let t = Instant::now();
    let marked = engine.sweep_late_bookings().await;
    println!(
        "  swept {} of {} confirmed bookings in {:.2}ms",
        marked.len(),
        confirmed,
        t.elapsed().as_secs_f64() * 1000.0
    );
}

#[tokio::main]
async fn main() {
    println!("=== libsched stress benchmark ===\n");

    println!("[setup]");
    let (engine, clock) = setup().await;

    println!("\n[phase 1] sequential booking throughput");
    phase1_sequential(&engine).await;

    println!("\n[phase 2] contended slot admission");
    phase2_contended(engine.clone()).await;

    println!("\n[phase 3] slot board latency under write load");
    phase3_read_under_load(engine.clone()).await;

    println!("\n[phase 4] lateness sweep");
    phase4_sweep(engine, &clock).await;

    println!("\n=== benchmark complete ===");
}
