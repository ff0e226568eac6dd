use env_logger::{Builder, WriteStyle};
use log::{error, info, warn, LevelFilter};
use std::fs::OpenOptions;

/// Initialize the logging system with both file and console output
pub fn initialize_logging() -> Result<(), Box<dyn std::error::Error>> {
    // Create or append to log file with proper permissions
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("taskwarden.log")?;

    // Configure the logging system
    Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    info!("Logging system initialized");
    Ok(())
}

/// Helper function to format sensitive data for logging
fn format_sensitive(text: &str) -> String {
    if text.len() <= 4 {
        return "*".repeat(text.len());
    }
    format!("{}***{}", &text[0..2], &text[text.len() - 2..])
}

/// Add structured logging for authentication events
pub fn log_auth_event(event_type: &str, identifier: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            "Auth event: type={}, account={}, success=true, details={:?}",
            event_type,
            format_sensitive(identifier),
            details
        );
    } else {
        warn!(
            "Auth event: type={}, account={}, success=false, details={:?}",
            event_type,
            format_sensitive(identifier),
            details
        );
    }
}

/// Add structured logging for store operations
pub fn log_data_operation(
    operation: &str,
    identifier: &str,
    resource: &str,
    success: bool,
    details: Option<&str>,
) {
    if success {
        info!(
            "Data operation: op={}, account={}, resource={}, success=true, details={:?}",
            operation,
            format_sensitive(identifier),
            resource,
            details
        );
    } else {
        error!(
            "Data operation: op={}, account={}, resource={}, success=false, details={:?}",
            operation,
            format_sensitive(identifier),
            resource,
            details
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sensitive_data_formatting() {
        assert_eq!(format_sensitive("password"), "pa***rd");
        assert_eq!(format_sensitive("key"), "***");
        assert_eq!(format_sensitive("a@x.com"), "a@***om");
        assert_eq!(format_sensitive(""), "");
    }

    #[test]
    fn test_logging_initialization() {
        // Create temporary log file
        let log_file = NamedTempFile::new().unwrap();

        // Configure logging to use temporary file
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file.path())
            .unwrap();

        // Initialize logging
        let result = Builder::new()
            .filter_level(LevelFilter::Info)
            .format_timestamp_secs()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .try_init();

        // Verify initialization succeeded or logger was already initialized
        assert!(
            result.is_ok()
                || result
                    .unwrap_err()
                    .to_string()
                    .contains("already initialized")
        );
    }
}
