use std::io;

/// Custom error type covering every failure an operation can report
#[derive(Debug)]
pub enum Error {
    AlreadyExists,
    TokenExpired,
    TokenInvalid,
    DeliveryFailed(String),
    InternalCryptoFailure,
    Storage(String),
    IoError(io::Error),
}

// Implement conversion from io::Error to Error
impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::IoError(error)
    }
}

// Implementation of Display trait for Error
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::AlreadyExists => write!(f, "Account already exists"),
            Error::TokenExpired => write!(f, "Token has expired"),
            Error::TokenInvalid => write!(f, "Token is invalid"),
            Error::DeliveryFailed(msg) => write!(f, "Mail delivery failed: {}", msg),
            Error::InternalCryptoFailure => write!(f, "Internal cryptographic failure"),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::AlreadyExists.to_string(), "Account already exists");
        assert_eq!(Error::TokenExpired.to_string(), "Token has expired");
        assert_eq!(Error::TokenInvalid.to_string(), "Token is invalid");
        assert_eq!(
            Error::DeliveryFailed("relay refused".to_string()).to_string(),
            "Mail delivery failed: relay refused"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing file");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(err.to_string().contains("missing file"));
    }
}
