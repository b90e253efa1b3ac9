use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum_test::TestServer;
use time::OffsetDateTime;

use crate::app::build_app;
use crate::clock::MutableClock;
use crate::config::{test_config, AppConfig};
use crate::mail::RecordingMailer;
use crate::state::AppState;

/// In-memory application state plus handles on the collaborators tests steer.
pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<MutableClock>,
}

pub fn setup_test_app_state() -> TestApp {
    setup_test_app_state_with(test_config())
}

pub fn setup_test_app_state_with(config: AppConfig) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let clock = Arc::new(MutableClock::new(OffsetDateTime::now_utc()));
    let state = AppState::in_memory(Arc::new(config), mailer.clone(), clock.clone());
    TestApp {
        state,
        mailer,
        clock,
    }
}

/// HTTP test server over a fresh in-memory app.
pub fn setup_test_server() -> (TestServer, TestApp) {
    let app = setup_test_app_state();
    let server = TestServer::new(build_app(app.state.clone())).expect("test server");
    (server, app)
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    )
}
