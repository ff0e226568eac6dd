use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::info;

use super::sweep::NotificationSweep;

/// Runs the sweep on a fixed period in its own worker thread.
///
/// The worker sleeps on a channel with the period as timeout, so a
/// shutdown message (or the handle being dropped) interrupts the wait
/// immediately instead of finishing the sleep first.
pub struct SweepScheduler {
    period: Duration,
}

impl SweepScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Start the worker. The first sweep runs after one full period,
    /// matching a cron firing on the interval boundary.
    pub fn start(&self, sweep: NotificationSweep) -> SchedulerHandle {
        let period = self.period;
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            info!(
                "Sweep scheduler started, period={}s",
                period.as_secs()
            );
            loop {
                match shutdown_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        sweep.run();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        info!("Sweep scheduler stopping");
                        break;
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            worker: Some(worker),
        }
    }
}

/// Owner handle for a running scheduler
pub struct SchedulerHandle {
    shutdown: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop the worker and wait for it to exit. A sweep already in
    /// flight finishes first.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Block the calling thread for the lifetime of the worker
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::store::{CredentialStore, MemoryCredentialStore};
    use crate::modules::email::MailTransport;
    use crate::modules::error::Error;
    use crate::modules::tasks::model::TaskRecord;
    use crate::modules::tasks::store::MemoryTodoStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Transport that only counts deliveries
    struct CountingMailer {
        deliveries: AtomicUsize,
    }

    impl MailTransport for CountingMailer {
        fn send(&self, _: &str, _: &str, _: &str, _: Option<&str>) -> Result<(), Error> {
            self.deliveries.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sweep_with_one_overdue_task(mailer: Arc<CountingMailer>) -> NotificationSweep {
        let accounts = Arc::new(MemoryCredentialStore::new());
        accounts.insert("a@x.com", "hash").unwrap();
        let todos = Arc::new(MemoryTodoStore::new());
        todos
            .add(TaskRecord {
                owner: "a@x.com".to_string(),
                description: "overdue thing".to_string(),
                due_at: Some(1),
                completed: false,
            })
            .unwrap();
        NotificationSweep::new(accounts, todos, mailer)
    }

    #[test]
    fn test_scheduler_runs_sweeps_periodically() {
        let mailer = Arc::new(CountingMailer {
            deliveries: AtomicUsize::new(0),
        });
        let sweep = sweep_with_one_overdue_task(mailer.clone());

        let handle = SweepScheduler::new(Duration::from_millis(20)).start(sweep);
        thread::sleep(Duration::from_millis(150));
        handle.shutdown();

        // Several periods elapsed, so several sweeps ran; the exact
        // count depends on scheduling, at least one is guaranteed
        assert!(mailer.deliveries.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_shutdown_interrupts_long_period() {
        let mailer = Arc::new(CountingMailer {
            deliveries: AtomicUsize::new(0),
        });
        let sweep = sweep_with_one_overdue_task(mailer.clone());

        // An hour-long period: shutdown must not wait for it
        let handle = SweepScheduler::new(Duration::from_secs(3_600)).start(sweep);
        let started = std::time::Instant::now();
        handle.shutdown();
        assert!(started.elapsed() < Duration::from_secs(5));

        // No period elapsed, so no sweep ran
        assert_eq!(mailer.deliveries.load(Ordering::SeqCst), 0);
    }
}
