//! Session Validation and Refresh
//!
//! # Modules
//!
//! - [`validator`] - confirms a session is authenticated
//! - [`refresher`] - extends a session's lifetime
//! - [`keeper`] - facade wiring both to one cache and transport

pub mod keeper;
pub mod refresher;
pub mod validator;

pub use keeper::SessionKeeper;
pub use refresher::SessionRefresher;
pub use validator::SessionValidator;
