//! Mock objects and fake implementations for testing
//!
//! [`FakeTransport`] replays scripted responses per URL, in order, and
//! records every request it sees. A URL with nothing left to replay fails
//! like an unreachable host.

use crate::token::Clock;
use crate::transport::{TransportError, UpstreamRequest, UpstreamResponse, UpstreamTransport};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Scripted = Result<UpstreamResponse, TransportError>;

#[derive(Default)]
struct FakeState {
    scripts: HashMap<String, VecDeque<Scripted>>,
    requests: Vec<UpstreamRequest>,
}

/// Scripted in-memory transport
#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<FakeState>,
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a response for the next unanswered call to `url`
    pub fn push_response(&self, url: &str, response: UpstreamResponse) {
        self.push(url, Ok(response));
    }

    /// Queue a transport failure for the next unanswered call to `url`
    pub fn push_error(&self, url: &str, error: TransportError) {
        self.push(url, Err(error));
    }

    fn push(&self, url: &str, scripted: Scripted) {
        self.state()
            .scripts
            .entry(url.to_string())
            .or_default()
            .push_back(scripted);
    }

    /// Every request sent so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.state().requests.clone()
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.state().requests.len()
    }

    #[must_use]
    pub fn calls_to(&self, url: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|request| request.url == url)
            .count()
    }

    /// Scripted responses not yet consumed, across all URLs
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state().scripts.values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl UpstreamTransport for FakeTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut state = self.state();
        let url = request.url.clone();
        state.requests.push(request);
        state
            .scripts
            .get_mut(&url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Request(format!(
                    "no scripted response for {url}"
                )))
            })
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Start at a fixed, arbitrary instant
    ///
    /// # Panics
    ///
    /// Never in practice; the start instant is a valid constant date.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("constant start instant is valid");
        Self::starting_at(start)
    }

    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
