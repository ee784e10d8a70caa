#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the cookie keeper
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod models;
pub mod platform;
pub mod session;
pub mod settings;
pub mod token;
pub mod transport;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use handlers::{health, refresh_session, validate_session};
pub use models::{AuthenticatedUser, RefreshOutcome, ValidationOutcome};
pub use session::SessionKeeper;
pub use settings::KeeperSettings;
