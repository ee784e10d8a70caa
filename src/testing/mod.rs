//! Unified testing utilities
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built endpoints, responses and settings
//! - [`mock`] - Scripted fake transport and a manually driven clock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cookiekeeper::testing::{FakeTransport, ManualClock, TestFixtures};
//! use cookiekeeper::SessionKeeper;
//!
//! let settings = TestFixtures::settings();
//! let transport = Arc::new(FakeTransport::new());
//! transport.push_response(
//!     &settings.endpoints.acquisition[0].url,
//!     TestFixtures::token_response("T1"),
//! );
//! let keeper = SessionKeeper::with_transport(&settings, transport, Box::new(ManualClock::new()));
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::{FakeTransport, ManualClock};

/// Common test constants
pub mod constants {
    /// Default test session identifier
    pub const TEST_SESSION: &str = "_|WARNING:-DO-NOT-SHARE-THIS.|_TESTSESSION0001";

    /// Default anti-forgery token handed out by fixtures
    pub const TEST_TOKEN: &str = "csrf-test-token";

    /// Base URL used by fixture endpoints
    pub const TEST_BASE_URL: &str = "https://platform.test";
}
