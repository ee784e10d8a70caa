//! Anti-forgery token handling
//!
//! - [`cache`] - per-session token cache with a freshness window
//! - [`acquirer`] - probes upstream endpoints for a new token

pub mod acquirer;
pub mod cache;

pub use acquirer::{AcquireError, TokenAcquirer};
pub use cache::{Clock, SystemClock, TokenCache};
