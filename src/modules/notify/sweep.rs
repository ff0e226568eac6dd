use std::sync::Arc;

use log::{info, warn};

use crate::modules::auth::store::CredentialStore;
use crate::modules::email::templates;
use crate::modules::email::MailTransport;
use crate::modules::tasks::store::TodoStore;
use crate::modules::utils::time::get_current_timestamp;

/// What one sweep execution did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub accounts_scanned: usize,
    pub reminders_sent: usize,
    pub failures: usize,
}

/// Periodic overdue-task scan.
///
/// A sweep is a best-effort broadcast, not a transaction: per-account
/// store or delivery failures are logged and skipped, every remaining
/// account still gets its attempt, and the sweep itself never fails.
pub struct NotificationSweep {
    accounts: Arc<dyn CredentialStore>,
    todos: Arc<dyn TodoStore>,
    mailer: Arc<dyn MailTransport>,
}

impl NotificationSweep {
    pub fn new(
        accounts: Arc<dyn CredentialStore>,
        todos: Arc<dyn TodoStore>,
        mailer: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            accounts,
            todos,
            mailer,
        }
    }

    /// Run one sweep against the current clock
    pub fn run(&self) -> SweepSummary {
        self.run_at(get_current_timestamp())
    }

    /// Run one sweep; every overdue decision uses the same `now`
    pub fn run_at(&self, now: u64) -> SweepSummary {
        let mut summary = SweepSummary {
            accounts_scanned: 0,
            reminders_sent: 0,
            failures: 0,
        };

        let accounts = match self.accounts.list_all() {
            Ok(accounts) => accounts,
            Err(e) => {
                // Nothing to iterate; report an empty cycle rather than
                // propagate
                warn!("Sweep could not enumerate accounts: {}", e);
                summary.failures += 1;
                return summary;
            }
        };

        info!("Sweep started: {} accounts to check", accounts.len());

        for account in &accounts {
            summary.accounts_scanned += 1;

            let tasks = match self.todos.list_by_owner(&account.identifier) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(
                        "Skipping account in sweep, task fetch failed: {}",
                        e
                    );
                    summary.failures += 1;
                    continue;
                }
            };

            let overdue: Vec<_> = tasks
                .into_iter()
                .filter(|task| task.is_overdue(now))
                .collect();
            if overdue.is_empty() {
                continue;
            }

            let content = templates::reminder_email(&overdue);
            match self.mailer.send(
                &account.identifier,
                &content.subject,
                &content.text,
                content.html.as_deref(),
            ) {
                Ok(()) => summary.reminders_sent += 1,
                Err(e) => {
                    warn!("Skipping account in sweep, reminder failed: {}", e);
                    summary.failures += 1;
                }
            }
        }

        info!(
            "Sweep completed: scanned={}, reminders={}, failures={}",
            summary.accounts_scanned, summary.reminders_sent, summary.failures
        );
        summary
    }
}
