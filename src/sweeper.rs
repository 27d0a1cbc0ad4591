use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::engine::Engine;

/// Handle to a running lateness sweeper. Dropping it does not stop the task;
/// call [`Sweeper::shutdown`].
pub struct Sweeper {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Sweep once right away, then every `interval` until shut down.
    pub async fn start(engine: Arc<Engine>, interval: Duration) -> Self {
        sweep_once(&engine).await;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_sweeper(engine, interval, cancel.clone()));
        Self { cancel, task }
    }

    /// Stop the periodic task and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("sweeper task failed: {e}");
        }
        info!("lateness sweeper stopped");
    }
}

/// Background task that periodically marks late CONFIRMED bookings as NO_SHOW.
pub async fn run_sweeper(engine: Arc<Engine>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                sweep_once(&engine).await;
            }
        }
    }
}

async fn sweep_once(engine: &Engine) {
    let started = std::time::Instant::now();
    let marked = engine.sweep_late_bookings().await;
    metrics::histogram!(crate::observability::SWEEP_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
    if !marked.is_empty() {
        info!("sweep marked {} bookings NO_SHOW", marked.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SlotCatalog;
    use crate::clock::ManualClock;
    use crate::config::Policy;
    use crate::model::*;
    use crate::notify::NotifyHub;
    use chrono::{NaiveDate, TimeDelta};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    async fn setup(clock: Arc<ManualClock>) -> (Arc<Engine>, BookingId) {
        let engine = Arc::new(Engine::new(
            SlotCatalog::standard(),
            Policy::default(),
            clock,
            Arc::new(NotifyHub::new()),
        ));
        engine
            .insert_resource(Resource {
                id: ResourceId::new("comp-1"),
                name: "Computer 1".into(),
                resource_type: ResourceType::Computer,
                description: String::new(),
            })
            .await
            .unwrap();
        engine.register_user(User {
            id: UserId::new("a"),
            name: "A".into(),
            role: UserRole::Student,
            department: None,
        });
        let booking = engine
            .create_booking(
                &ResourceId::new("comp-1"),
                &UserId::new("a"),
                day(),
                "9:00 AM - 10:00 AM",
            )
            .await
            .unwrap()
            .accepted()
            .unwrap();
        (engine, booking.id)
    }

    #[tokio::test]
    async fn start_sweeps_eagerly() {
        let clock = Arc::new(ManualClock::new(day().and_hms_opt(8, 0, 0).unwrap()));
        let (engine, id) = setup(clock.clone()).await;

        clock.set(day().and_hms_opt(9, 16, 0).unwrap());
        let sweeper = Sweeper::start(engine.clone(), Duration::from_secs(3600)).await;
        assert_eq!(
            engine.get_booking(&id).await.unwrap().status,
            BookingStatus::NoShow
        );
        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_tick_marks_late_booking() {
        let clock = Arc::new(ManualClock::new(day().and_hms_opt(9, 0, 0).unwrap()));
        let (engine, id) = setup(clock.clone()).await;

        let sweeper = Sweeper::start(engine.clone(), Duration::from_secs(60)).await;
        assert_eq!(
            engine.get_booking(&id).await.unwrap().status,
            BookingStatus::Confirmed
        );

        clock.advance(TimeDelta::minutes(16));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(
            engine.get_booking(&id).await.unwrap().status,
            BookingStatus::NoShow
        );
        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticking() {
        let clock = Arc::new(ManualClock::new(day().and_hms_opt(9, 0, 0).unwrap()));
        let (engine, id) = setup(clock.clone()).await;

        let sweeper = Sweeper::start(engine.clone(), Duration::from_secs(60)).await;
        sweeper.shutdown().await;

        clock.advance(TimeDelta::hours(2));
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(
            engine.get_booking(&id).await.unwrap().status,
            BookingStatus::Confirmed
        );
    }
}
