// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{
    auth,
    config,
    email,
    error,
    notify,
    tasks,
    utils,
};

// Re-export commonly used types
pub use modules::auth::lifecycle::AuthLifecycle;
pub use modules::auth::store::{Account, CredentialStore};
pub use modules::auth::tokens::{TokenPurpose, TokenService};
pub use modules::config::AppConfig;
pub use modules::email::MailTransport;
pub use modules::error::Error;
pub use modules::notify::sweep::NotificationSweep;
pub use modules::tasks::model::TaskRecord;
pub use modules::tasks::store::TodoStore;

// Constants
pub const VERIFICATION_TOKEN_TTL: u64 = 86_400; // 24 hours
pub const SESSION_TOKEN_TTL: u64 = 3_600; // 1 hour
pub const DEFAULT_SWEEP_INTERVAL: u64 = 12 * 3_600;
pub const USERS_FILE: &str = "users.json";
pub const TODOS_FILE: &str = "todos.json";

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
