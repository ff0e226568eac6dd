pub mod hashing;
pub mod lifecycle;
pub mod store;
pub mod tokens;

// Re-export the main types and functions
pub use hashing::PasswordHasher;
pub use lifecycle::{AuthLifecycle, DispatchOutcome, LoginSession, Registration};
pub use store::{Account, CredentialStore, JsonCredentialStore, MemoryCredentialStore, VerificationStatus};
pub use tokens::{TokenPurpose, TokenService};
