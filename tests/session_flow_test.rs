// End-to-end validation flows through SessionKeeper over a scripted transport
use chrono::Duration;
use cookiekeeper::models::outcome::{
    ERR_MISSING_COOKIE, ERR_NO_TOKEN, ERR_SESSION_INVALID, ERR_TOKEN_RETRY_FAILED,
};
use cookiekeeper::settings::KeeperSettings;
use cookiekeeper::testing::constants::TEST_SESSION;
use cookiekeeper::testing::{FakeTransport, ManualClock, TestFixtures};
use cookiekeeper::transport::UpstreamResponse;
use cookiekeeper::SessionKeeper;
use std::sync::Arc;

struct Setup {
    transport: Arc<FakeTransport>,
    clock: ManualClock,
    settings: KeeperSettings,
    keeper: SessionKeeper,
}

fn setup_with(settings: KeeperSettings) -> Setup {
    let transport = Arc::new(FakeTransport::new());
    let clock = ManualClock::new();
    let keeper =
        SessionKeeper::with_transport(&settings, transport.clone(), Box::new(clock.clone()));
    Setup {
        transport,
        clock,
        settings,
        keeper,
    }
}

fn setup() -> Setup {
    setup_with(TestFixtures::settings())
}

impl Setup {
    fn acquisition_url(&self, index: usize) -> String {
        self.settings.endpoints.acquisition[index].url.clone()
    }

    fn identity_url(&self) -> String {
        self.settings.endpoints.identity.url.clone()
    }

    fn acquisition_calls(&self) -> usize {
        self.settings
            .endpoints
            .acquisition
            .iter()
            .map(|endpoint| self.transport.calls_to(&endpoint.url))
            .sum()
    }

    fn tokens_sent_to(&self, url: &str) -> Vec<Option<String>> {
        self.transport
            .requests()
            .iter()
            .filter(|request| request.url == url)
            .map(|request| request.header("x-csrf-token").map(str::to_string))
            .collect()
    }
}

#[tokio::test]
async fn test_second_validate_within_window_reuses_token() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    for _ in 0..2 {
        s.transport.push_response(
            &s.identity_url(),
            TestFixtures::identity_response(7, "alpha", "Alpha"),
        );
    }

    let first = s.keeper.validate(TEST_SESSION).await;
    s.clock.advance(Duration::seconds(299));
    let second = s.keeper.validate(TEST_SESSION).await;

    assert!(first.valid);
    assert!(second.valid);
    assert_eq!(s.acquisition_calls(), 1);
    assert_eq!(
        s.tokens_sent_to(&s.identity_url()),
        vec![Some("T1".to_string()), Some("T1".to_string())]
    );
}

#[tokio::test]
async fn test_expired_token_is_reacquired() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T2"));
    for _ in 0..2 {
        s.transport.push_response(
            &s.identity_url(),
            TestFixtures::identity_response(7, "alpha", "Alpha"),
        );
    }

    s.keeper.validate(TEST_SESSION).await;
    s.clock.advance(Duration::minutes(5));
    assert_eq!(s.keeper.token_cache().lookup(TEST_SESSION), None);

    let outcome = s.keeper.validate(TEST_SESSION).await;

    assert!(outcome.valid);
    assert_eq!(s.acquisition_calls(), 2);
    assert_eq!(
        s.tokens_sent_to(&s.identity_url()),
        vec![Some("T1".to_string()), Some("T2".to_string())]
    );
    assert_eq!(
        s.keeper.token_cache().lookup(TEST_SESSION),
        Some("T2".to_string())
    );
}

#[tokio::test]
async fn test_kth_acquisition_endpoint_wins() {
    let s = setup_with(TestFixtures::settings_with(4, 1));
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::csrf_rejection());
    s.transport
        .push_error(&s.acquisition_url(1), TestFixtures::connect_error());
    s.transport
        .push_response(&s.acquisition_url(2), TestFixtures::token_response("T3"));
    s.transport.push_response(
        &s.identity_url(),
        TestFixtures::identity_response(1, "k", "K"),
    );

    let outcome = s.keeper.validate(TEST_SESSION).await;

    assert!(outcome.valid);
    assert_eq!(s.acquisition_calls(), 3);
    assert_eq!(s.transport.calls_to(&s.acquisition_url(3)), 0);
    assert_eq!(
        s.tokens_sent_to(&s.identity_url()),
        vec![Some("T3".to_string())]
    );
}

#[tokio::test]
async fn test_no_acquisition_endpoint_yields_token() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), UpstreamResponse::new(200));
    s.transport
        .push_error(&s.acquisition_url(1), TestFixtures::timeout_error());

    let outcome = s.keeper.validate(TEST_SESSION).await;

    assert!(!outcome.valid);
    assert_eq!(outcome.error.as_deref(), Some(ERR_NO_TOKEN));
    assert_eq!(s.transport.calls_to(&s.identity_url()), 0);
}

#[tokio::test]
async fn test_unauthorized_identity_is_terminal() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    s.transport
        .push_response(&s.identity_url(), UpstreamResponse::new(401));

    let outcome = s.keeper.validate(TEST_SESSION).await;

    assert!(!outcome.valid);
    assert_eq!(outcome.error.as_deref(), Some(ERR_SESSION_INVALID));
    assert_eq!(s.transport.calls_to(&s.identity_url()), 1);
    assert_eq!(s.acquisition_calls(), 1);
}

#[tokio::test]
async fn test_token_rejection_then_success_retries_once() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T2"));
    s.transport
        .push_response(&s.identity_url(), TestFixtures::csrf_rejection());
    s.transport.push_response(
        &s.identity_url(),
        TestFixtures::identity_response(99, "retried", "Retried User"),
    );

    let outcome = s.keeper.validate(TEST_SESSION).await;

    assert!(outcome.valid);
    assert_eq!(outcome.user_id, Some(99));
    assert_eq!(outcome.username.as_deref(), Some("retried"));
    assert_eq!(outcome.display_name.as_deref(), Some("Retried User"));
    assert_eq!(
        s.tokens_sent_to(&s.identity_url()),
        vec![Some("T1".to_string()), Some("T2".to_string())]
    );
    assert_eq!(
        s.keeper.token_cache().lookup(TEST_SESSION),
        Some("T2".to_string())
    );
}

#[tokio::test]
async fn test_second_token_rejection_is_not_retried() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T2"));
    s.transport
        .push_response(&s.identity_url(), TestFixtures::csrf_rejection());
    s.transport
        .push_response(&s.identity_url(), TestFixtures::csrf_rejection());
    s.transport.push_response(
        &s.identity_url(),
        TestFixtures::identity_response(1, "never", "Never"),
    );

    let outcome = s.keeper.validate(TEST_SESSION).await;

    assert!(!outcome.valid);
    assert_eq!(outcome.error.as_deref(), Some(ERR_TOKEN_RETRY_FAILED));
    assert_eq!(s.transport.calls_to(&s.identity_url()), 2);
    assert_eq!(s.transport.pending(), 1);
}

#[tokio::test]
async fn test_s1_first_endpoint_throws_second_hands_out_token() {
    let s = setup();
    s.transport
        .push_error(&s.acquisition_url(0), TestFixtures::connect_error());
    s.transport.push_response(
        &s.acquisition_url(1),
        UpstreamResponse::new(200).with_header("x-csrf-token", "T1"),
    );
    s.transport.push_response(
        &s.identity_url(),
        TestFixtures::identity_response(1, "s1", "S1"),
    );

    let outcome = s.keeper.validate("S1").await;

    assert!(outcome.valid);
    assert_eq!(s.keeper.token_cache().lookup("S1"), Some("T1".to_string()));
}

#[tokio::test]
async fn test_cookie_prefix_is_stripped() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    s.transport.push_response(
        &s.identity_url(),
        TestFixtures::identity_response(1, "p", "P"),
    );

    let outcome = s.keeper.validate(" .ROBLOSECURITY=abc123 ").await;

    assert!(outcome.valid);
    let requests = s.transport.requests();
    assert!(requests
        .iter()
        .all(|request| request.header("cookie") == Some(".ROBLOSECURITY=abc123")));
    assert_eq!(
        s.keeper.token_cache().lookup("abc123"),
        Some("T1".to_string())
    );
}

#[tokio::test]
async fn test_blank_cookie_makes_no_calls() {
    let s = setup();

    let outcome = s.keeper.validate("  ").await;

    assert!(!outcome.valid);
    assert_eq!(outcome.error.as_deref(), Some(ERR_MISSING_COOKIE));
    assert_eq!(s.transport.total_calls(), 0);
}

#[tokio::test]
async fn test_outcome_json_shape() {
    let s = setup();
    s.transport
        .push_response(&s.acquisition_url(0), TestFixtures::token_response("T1"));
    s.transport
        .push_response(&s.identity_url(), UpstreamResponse::new(418));

    let outcome = s.keeper.validate(TEST_SESSION).await;
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(
        json,
        serde_json::json!({"valid": false, "error": "unexpected status 418"})
    );
}
