pub mod smtp;
pub mod templates;

use crate::modules::error::Error;

/// Outbound mail seam. Delivery failure is reported to the caller,
/// never silently swallowed.
pub trait MailTransport: Send + Sync {
    fn send(&self, to: &str, subject: &str, text: &str, html: Option<&str>) -> Result<(), Error>;
}

// Re-export the main types
pub use smtp::{SmtpConfig, SmtpMailer};
