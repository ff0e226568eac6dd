use lettre::message::{header::ContentType, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

use super::MailTransport;
use crate::modules::error::Error;

/// Bound on a single SMTP dispatch so a hung relay cannot stall callers
const SEND_TIMEOUT_SECS: u64 = 10;

/// SMTP endpoint and sender identity, supplied once at process start
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    // The email address/username for SMTP authentication
    pub username: String,
    // The password or app-specific password for SMTP
    pub password: String,
    // SMTP server hostname (e.g., smtp.gmail.com)
    pub host: String,
    // SMTP server port (typically 587 for TLS)
    pub port: u16,
    // Display name used in the From header
    pub from_name: String,
}

/// MailTransport over lettre's SMTP relay
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, to: &str, subject: &str, text: &str, html: Option<&str>) -> Result<(), Error> {
        let creds = &self.config;

        // Create email message
        let builder = Message::builder()
            .from(
                format!("{} <{}>", creds.from_name, creds.username)
                    .parse()
                    .map_err(|e| Error::DeliveryFailed(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| Error::DeliveryFailed(format!("Invalid to address: {}", e)))?)
            .subject(subject);

        let email = match html {
            Some(html_body) => builder
                .multipart(MultiPart::alternative_plain_html(
                    text.to_string(),
                    html_body.to_string(),
                ))
                .map_err(|e| Error::DeliveryFailed(format!("Failed to create email: {}", e)))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.to_string())
                .map_err(|e| Error::DeliveryFailed(format!("Failed to create email: {}", e)))?,
        };

        // Configure TLS parameters
        let tls_parameters = TlsParameters::builder(creds.host.clone())
            .build()
            .map_err(|e| Error::DeliveryFailed(format!("Failed to build TLS parameters: {}", e)))?;

        // Set up SMTP transport with explicit TLS configuration
        let mailer = SmtpTransport::relay(&creds.host)
            .map_err(|e| Error::DeliveryFailed(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(Credentials::new(
                creds.username.clone(),
                creds.password.clone(),
            ))
            .port(creds.port)
            .tls(Tls::Required(tls_parameters))
            .pool_config(PoolConfig::new().max_size(1))
            .timeout(Some(std::time::Duration::from_secs(SEND_TIMEOUT_SECS)))
            .build();

        // Send the email
        match mailer.send(&email) {
            Ok(_) => {
                info!("Email sent successfully to: {}", to);
                Ok(())
            }
            Err(e) => Err(Error::DeliveryFailed(format!(
                "Failed to send email: {} (This might be due to network issues, incorrect credentials, or provider security settings)",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            username: "robot@example.com".to_string(),
            password: "app-password".to_string(),
            host: "smtp.example.com".to_string(),
            port: 587,
            from_name: "Taskwarden".to_string(),
        }
    }

    #[test]
    fn test_invalid_recipient_is_delivery_failure() {
        // Address parsing happens before any network traffic, so a bad
        // recipient fails fast with the delivery error kind.
        let mailer = SmtpMailer::new(config());
        let result = mailer.send("not an address", "subject", "body", None);
        assert!(matches!(result, Err(Error::DeliveryFailed(_))));
    }
}
