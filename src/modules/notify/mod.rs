pub mod scheduler;
pub mod sweep;

// Re-export the main types
pub use scheduler::{SchedulerHandle, SweepScheduler};
pub use sweep::{NotificationSweep, SweepSummary};
