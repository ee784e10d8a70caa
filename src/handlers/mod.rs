// HTTP request handlers for the session keeper
pub mod health;
pub mod session;

pub use health::health;
pub use session::{json_config, refresh_session, validate_session};
