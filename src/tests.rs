use std::time::Duration;

use axum::http::StatusCode;
use axum_test::{
    multipart::{MultipartForm, Part},
    TestResponse, TestServer,
};
use serde_json::{json, Value};

use crate::envelope::Envelope;
use crate::friends::repo_types::FriendshipStatus;
use crate::test_utils::{bearer, setup_test_server, TestApp};

async fn register(server: &TestServer, name: &str, email: &str, password: &str) -> i64 {
    let res = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let body: Envelope<Value> = res.json();
    body.data.unwrap()["id"].as_i64().unwrap()
}

async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let res = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    res.assert_status_ok();
    let body: Envelope<Value> = res.json();
    body.data.unwrap()["token"].as_str().unwrap().to_string()
}

/// Registers, logs in and stores `phone` on the profile.
async fn member(server: &TestServer, name: &str, email: &str, phone: &str) -> (i64, String) {
    let id = register(server, name, email, "secret1").await;
    let token = login(server, email, "secret1").await;
    let (k, v) = bearer(&token);
    server
        .put("/api/v1/me")
        .add_header(k, v)
        .json(&json!({ "phone": phone }))
        .await
        .assert_status_ok();
    (id, token)
}

async fn get_data(server: &TestServer, path: &str, token: &str) -> Value {
    let (k, v) = bearer(token);
    let res = server.get(path).add_header(k, v).await;
    res.assert_status_ok();
    let body: Envelope<Value> = res.json();
    body.data.unwrap()
}

async fn post_json(server: &TestServer, path: &str, token: &str, body: Value) -> TestResponse {
    let (k, v) = bearer(token);
    server.post(path).add_header(k, v).json(&body).await
}

#[tokio::test]
async fn health_check() {
    let (server, _app) = setup_test_server();
    server.get("/health").await.assert_status_ok();
    server.get("/api/v1/health").await.assert_status_ok();
}

#[tokio::test]
async fn dev_user_balance_after_three_entries() {
    let (server, _app) = setup_test_server();
    register(&server, "Dev", "dev@example.com", "password").await;
    let token = login(&server, "dev@example.com", "password").await;

    for (kind, amount) in [("income", 4_500_000), ("expense", 20_000), ("expense", 12_000)] {
        let res = post_json(
            &server,
            "/api/v1/transactions",
            &token,
            json!({ "kind": kind, "category": "c", "amount": amount, "method": "cash" }),
        )
        .await;
        res.assert_status(StatusCode::CREATED);
    }

    let me = get_data(&server, "/api/v1/me", &token).await;
    assert_eq!(me["email"], "dev@example.com");
    assert_eq!(me["balance"].as_f64(), Some(4_468_000.0));

    let list = get_data(&server, "/api/v1/transactions", &token).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 3);
    // newest first
    assert_eq!(list[0]["amount"].as_f64(), Some(12_000.0));
}

#[tokio::test]
async fn negative_amount_is_rejected() {
    let (server, _app) = setup_test_server();
    register(&server, "Neg", "neg@example.com", "secret1").await;
    let token = login(&server, "neg@example.com", "secret1").await;

    let res = post_json(
        &server,
        "/api/v1/transactions",
        &token,
        json!({ "kind": "expense", "amount": -5 }),
    )
    .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Envelope<Value> = res.json();
    assert!(!body.success);
    assert_eq!(body.code, "400");
}

#[tokio::test]
async fn amounts_outside_the_stored_precision_are_rejected() {
    let (server, _app) = setup_test_server();
    register(&server, "Big", "big@example.com", "secret1").await;
    let token = login(&server, "big@example.com", "secret1").await;

    for amount in [json!(5e28), json!(10_000_000_000_000_000u64), json!(0.001)] {
        post_json(
            &server,
            "/api/v1/transactions",
            &token,
            json!({ "kind": "income", "amount": amount }),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    }

    post_json(
        &server,
        "/api/v1/transactions",
        &token,
        json!({ "kind": "income", "amount": 19.99 }),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let me = get_data(&server, "/api/v1/me", &token).await;
    assert_eq!(me["balance"].as_f64(), Some(19.99));
    let list = get_data(&server, "/api/v1/transactions", &token).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn register_validation_and_duplicates() {
    let (server, _app) = setup_test_server();
    register(&server, "Ana", "Ana@Example.com ", "secret1").await;

    let dup = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": "Ana 2", "email": "ana@example.com", "password": "secret1" }))
        .await;
    dup.assert_status(StatusCode::CONFLICT);

    let bad_email = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": "X", "email": "nope", "password": "secret1" }))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);

    let short = server
        .post("/api/v1/auth/register")
        .json(&json!({ "name": "X", "email": "x@example.com", "password": "123" }))
        .await;
    short.assert_status(StatusCode::BAD_REQUEST);

    let malformed = server
        .post("/api/v1/auth/register")
        .content_type("application/json")
        .text("{not json")
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    let body: Envelope<Value> = malformed.json();
    assert!(body.data.is_none());
}

#[tokio::test]
async fn login_failures_are_unauthorized() {
    let (server, _app) = setup_test_server();
    register(&server, "Ana", "ana@example.com", "secret1").await;

    for (email, password) in [("ana@example.com", "wrong-pass"), ("ghost@example.com", "secret1")] {
        let res = server
            .post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        res.assert_status(StatusCode::UNAUTHORIZED);
        let body: Envelope<Value> = res.json();
        assert_eq!(body.message, "Invalid credentials");
    }
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (server, _app) = setup_test_server();
    server.get("/api/v1/me").await.assert_status(StatusCode::UNAUTHORIZED);

    let (k, v) = bearer("not-a-jwt");
    let res = server.get("/api/v1/friends/list").add_header(k, v).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    let body: Envelope<Value> = res.json();
    assert_eq!(body.code, "401");
    assert!(!body.success);
}

#[tokio::test]
async fn login_and_logout_show_up_in_history() {
    let (server, _app) = setup_test_server();
    register(&server, "Ana", "ana@example.com", "secret1").await;
    let token = login(&server, "ana@example.com", "secret1").await;
    let (k, v) = bearer(&token);
    server.post("/api/v1/auth/logout").add_header(k, v).await.assert_status_ok();

    // audit writes are asynchronous
    let mut events = Vec::new();
    for _ in 0..50 {
        let data = get_data(&server, "/api/v1/auth/history", &token).await;
        events = data["events"].as_array().cloned().unwrap_or_default();
        if events.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let kinds: Vec<_> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&"login"));
    assert!(kinds.contains(&"logout"));
}

async fn issue_otp(server: &TestServer, app: &TestApp, email: &str) -> String {
    let res = server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": email }))
        .await;
    res.assert_status_ok();
    let body: Envelope<Value> = res.json();
    assert_eq!(body.data.unwrap()["expires_in"], 900);
    app.mailer.last_otp_for(email).expect("otp was mailed")
}

#[tokio::test]
async fn expired_otp_is_refused_and_kept() {
    let (server, app) = setup_test_server();
    register(&server, "Ana", "ana@example.com", "secret1").await;
    let otp = issue_otp(&server, &app, "ana@example.com").await;

    app.clock.advance(time::Duration::minutes(16));

    let res = server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "email": "ana@example.com", "otp": otp, "password": "newpass1" }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Envelope<Value> = res.json();
    assert_eq!(body.message, "OTP has expired");

    let kept = app.state.resets.find("ana@example.com", &otp).await.unwrap();
    assert!(kept.is_some());

    // old password still works
    login(&server, "ana@example.com", "secret1").await;
}

#[tokio::test]
async fn otp_reset_changes_password_once() {
    let (server, app) = setup_test_server();
    register(&server, "Ana", "ana@example.com", "secret1").await;

    let unknown = server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": "ghost@example.com" }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);

    let first = issue_otp(&server, &app, "ana@example.com").await;
    let otp = issue_otp(&server, &app, "ana@example.com").await;
    if first != otp {
        // a newer code replaces the earlier one
        let res = server
            .post("/api/v1/auth/verify-otp")
            .json(&json!({ "email": "ana@example.com", "otp": first }))
            .await;
        res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    server
        .post("/api/v1/auth/verify-otp")
        .json(&json!({ "email": "ana@example.com", "otp": otp }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "email": "ana@example.com", "otp": otp, "password": "newpass1" }))
        .await
        .assert_status_ok();

    login(&server, "ana@example.com", "newpass1").await;
    server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "secret1" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let reuse = server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "email": "ana@example.com", "otp": otp, "password": "another1" }))
        .await;
    reuse.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Envelope<Value> = reuse.json();
    assert_eq!(body.message, "Invalid OTP");

    assert_eq!(
        app.mailer.confirmations.lock().unwrap().as_slice(),
        ["ana@example.com".to_string()]
    );
}

#[tokio::test]
async fn friend_request_lifecycle() {
    let (server, app) = setup_test_server();
    let (b_id, b_token) = member(&server, "Budi", "budi@example.com", "085971234567").await;
    let (a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;
    assert!(b_id < a_id);

    // international spelling finds the domestic number
    let res = post_json(
        &server,
        "/api/v1/friends/request",
        &a_token,
        json!({ "phone": "+62 859 7123 4567" }),
    )
    .await;
    res.assert_status(StatusCode::CREATED);
    let body: Envelope<Value> = res.json();
    let row = body.data.unwrap();
    let friendship_id = row["id"].as_i64().unwrap();
    assert_eq!(row["user_id"].as_i64(), Some(b_id));
    assert_eq!(row["friend_id"].as_i64(), Some(a_id));
    assert_eq!(row["requester_id"].as_i64(), Some(a_id));
    assert_eq!(row["status"], "pending");

    // opposite direction while pending
    let res = post_json(
        &server,
        "/api/v1/friends/request",
        &b_token,
        json!({ "phone": "081111111111" }),
    )
    .await;
    res.assert_status(StatusCode::CONFLICT);

    let a_pending = get_data(&server, "/api/v1/friends/pending", &a_token).await;
    assert_eq!(a_pending["sent"].as_array().unwrap().len(), 1);
    assert_eq!(a_pending["received"].as_array().unwrap().len(), 0);
    let b_pending = get_data(&server, "/api/v1/friends/pending", &b_token).await;
    assert_eq!(b_pending["sent"].as_array().unwrap().len(), 0);
    assert_eq!(b_pending["received"][0]["friend_id"].as_i64(), Some(a_id));

    let accept = format!("/api/v1/friends/accept/{friendship_id}");
    post_json(&server, &accept, &b_token, json!({})).await.assert_status_ok();
    // already accepted
    post_json(&server, &accept, &b_token, json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let a_friends = get_data(&server, "/api/v1/friends/list", &a_token).await;
    assert_eq!(a_friends["friends"][0]["id"].as_i64(), Some(b_id));
    assert_eq!(a_friends["friends"][0]["is_debt"], false);
    let b_friends = get_data(&server, "/api/v1/friends/list", &b_token).await;
    assert_eq!(b_friends["friends"][0]["id"].as_i64(), Some(a_id));

    let res = post_json(
        &server,
        "/api/v1/friends/request",
        &b_token,
        json!({ "phone": "081111111111" }),
    )
    .await;
    res.assert_status(StatusCode::CONFLICT);
    let body: Envelope<Value> = res.json();
    assert_eq!(body.message, "Already friends");

    // toggle twice restores the flag
    let toggle = format!("/api/v1/friends/{b_id}/toggle-debt");
    let res = post_json(&server, &toggle, &a_token, json!({})).await;
    res.assert_status_ok();
    let body: Envelope<Value> = res.json();
    assert_eq!(body.data.unwrap()["debt_user_id"].as_i64(), Some(a_id));
    let a_friends = get_data(&server, "/api/v1/friends/list", &a_token).await;
    assert_eq!(a_friends["friends"][0]["is_debt"], true);
    let b_friends = get_data(&server, "/api/v1/friends/list", &b_token).await;
    assert_eq!(b_friends["friends"][0]["is_debt"], false);

    let res = post_json(&server, &toggle, &a_token, json!({})).await;
    let body: Envelope<Value> = res.json();
    assert!(body.data.unwrap()["debt_user_id"].is_null());

    let (k, v) = bearer(&a_token);
    server
        .delete(&format!("/api/v1/friends/{b_id}"))
        .add_header(k, v)
        .await
        .assert_status_ok();
    let a_friends = get_data(&server, "/api/v1/friends/list", &a_token).await;
    assert_eq!(a_friends["friends"], json!([]));

    let stored = app
        .state
        .friendships
        .list_for_member(a_id, FriendshipStatus::Accepted)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn reject_by_phone_allows_a_new_request() {
    let (server, _app) = setup_test_server();
    let (_a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;
    let (_b_id, b_token) = member(&server, "Budi", "budi@example.com", "082222222222").await;

    post_json(&server, "/api/v1/friends/request", &a_token, json!({ "phone": "082222222222" }))
        .await
        .assert_status(StatusCode::CREATED);

    post_json(&server, "/api/v1/friends/reject", &b_token, json!({ "phone": "6281111111111" }))
        .await
        .assert_status_ok();

    let pending = get_data(&server, "/api/v1/friends/pending", &b_token).await;
    assert_eq!(pending["received"], json!([]));

    post_json(&server, "/api/v1/friends/request", &b_token, json!({ "phone": "081111111111" }))
        .await
        .assert_status(StatusCode::CREATED);
    post_json(&server, "/api/v1/friends/accept", &a_token, json!({ "phone": "082222222222" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn friend_request_edge_cases() {
    let (server, _app) = setup_test_server();
    let (_a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;

    let own = post_json(
        &server,
        "/api/v1/friends/request",
        &a_token,
        json!({ "phone": "081111111111" }),
    )
    .await;
    own.assert_status(StatusCode::BAD_REQUEST);

    let missing = post_json(
        &server,
        "/api/v1/friends/request",
        &a_token,
        json!({ "phone": "089999999999" }),
    )
    .await;
    missing.assert_status(StatusCode::NOT_FOUND);

    let blank = post_json(
        &server,
        "/api/v1/friends/request",
        &a_token,
        json!({ "phone": " " }),
    )
    .await;
    blank.assert_status(StatusCode::BAD_REQUEST);

    let friends = get_data(&server, "/api/v1/friends/list", &a_token).await;
    assert_eq!(friends["friends"], json!([]));
    let pending = get_data(&server, "/api/v1/friends/pending", &a_token).await;
    assert_eq!(pending, json!({ "sent": [], "received": [] }));

    let (k, v) = bearer(&a_token);
    server
        .post("/api/v1/friends/999/toggle-debt")
        .add_header(k, v)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let (k, v) = bearer(&a_token);
    server
        .post("/api/v1/friends/accept/not-a-number")
        .add_header(k, v)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_by_phone_name_and_free_text() {
    let (server, _app) = setup_test_server();
    let (_a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;
    let (b_id, _b_token) =
        member(&server, "Budi Santoso", "budi@example.com", "+62 822-2222-2222").await;

    let by_phone = get_data(&server, "/api/v1/friends/search?phone=082222222222", &a_token).await;
    assert_eq!(by_phone["users"][0]["id"].as_i64(), Some(b_id));
    assert_eq!(by_phone["users"][0]["is_friend"], false);
    assert_eq!(by_phone["users"][0]["has_pending"], false);

    let by_q = get_data(&server, "/api/v1/friends/search?q=santoso", &a_token).await;
    assert_eq!(by_q["users"].as_array().unwrap().len(), 1);

    post_json(&server, "/api/v1/friends/request", &a_token, json!({ "phone": "082222222222" }))
        .await
        .assert_status(StatusCode::CREATED);
    let by_q_phone = get_data(
        &server,
        "/api/v1/friends/search?q=%2B62%20822%202222%202222",
        &a_token,
    )
    .await;
    assert_eq!(by_q_phone["users"][0]["has_pending"], true);

    let (k, v) = bearer(&a_token);
    server
        .get("/api/v1/friends/search?q=zzz")
        .add_header(k, v)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let (k, v) = bearer(&a_token);
    server
        .get("/api/v1/friends/search")
        .add_header(k, v)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_update_and_public_view() {
    let (server, _app) = setup_test_server();
    let (a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;
    let (_b_id, b_token) = member(&server, "Budi", "budi@example.com", "082222222222").await;

    let (k, v) = bearer(&a_token);
    let res = server
        .put("/api/v1/me")
        .add_header(k, v)
        .json(&json!({ "name": "Ana Maria", "birthday": "1999-04-02", "gender": "female" }))
        .await;
    res.assert_status_ok();
    let body: Envelope<Value> = res.json();
    let me = body.data.unwrap();
    assert_eq!(me["name"], "Ana Maria");
    assert_eq!(me["birthday"], "1999-04-02T00:00:00Z");
    assert_eq!(me["phone"], "081111111111");
    assert_eq!(me["balance"].as_f64(), Some(0.0));

    let (k, v) = bearer(&a_token);
    server
        .put("/api/v1/me")
        .add_header(k, v)
        .json(&json!({ "birthday": "yesterday" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let public = get_data(&server, &format!("/api/v1/users/{a_id}"), &b_token).await;
    assert_eq!(public["name"], "Ana Maria");
    assert!(public["joined"].is_string());
    assert!(public.get("balance").is_none());

    let (k, v) = bearer(&b_token);
    server
        .get("/api/v1/users/9999")
        .add_header(k, v)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn avatar_upload_updates_profile_image() {
    let (server, _app) = setup_test_server();
    let (a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;

    let form = MultipartForm::new().add_part(
        "avatar",
        Part::bytes(vec![0x89, b'P', b'N', b'G'])
            .file_name("me.png")
            .mime_type("image/png"),
    );
    let (k, v) = bearer(&a_token);
    let res = server.post("/api/v1/me/avatar").add_header(k, v).multipart(form).await;
    res.assert_status_ok();
    let body: Envelope<Value> = res.json();
    let img = body.data.unwrap()["img"].as_str().unwrap().to_string();
    assert!(img.starts_with(&format!("memory://avatars/{a_id}/")));
    assert!(img.ends_with(".png"));

    let me = get_data(&server, "/api/v1/me", &a_token).await;
    assert_eq!(me["img"].as_str(), Some(img.as_str()));

    let form = MultipartForm::new().add_part(
        "avatar",
        Part::bytes(b"hello".to_vec())
            .file_name("me.txt")
            .mime_type("text/plain"),
    );
    let (k, v) = bearer(&a_token);
    server
        .post("/api/v1/me/avatar")
        .add_header(k, v)
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_change_notice_does_not_undo_reset() {
    use std::sync::Arc;

    use crate::app::build_app;
    use crate::clock::SystemClock;
    use crate::config::test_config;
    use crate::mail::RecordingMailer;
    use crate::state::AppState;

    let mailer = Arc::new(RecordingMailer {
        fail_confirmations: true,
        ..Default::default()
    });
    let state = AppState::in_memory(Arc::new(test_config()), mailer.clone(), Arc::new(SystemClock));
    let server = TestServer::new(build_app(state)).unwrap();

    register(&server, "Ana", "ana@example.com", "secret1").await;
    server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": "ana@example.com" }))
        .await
        .assert_status_ok();
    let otp = mailer.last_otp_for("ana@example.com").unwrap();

    server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "email": "ana@example.com", "otp": otp, "password": "newpass1" }))
        .await
        .assert_status_ok();
    login(&server, "ana@example.com", "newpass1").await;
    assert!(mailer.confirmations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pending_pair_can_be_removed_but_not_flagged() {
    let (server, _app) = setup_test_server();
    let (a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;
    let (b_id, b_token) = member(&server, "Budi", "budi@example.com", "082222222222").await;

    post_json(&server, "/api/v1/friends/request", &a_token, json!({ "phone": "082222222222" }))
        .await
        .assert_status(StatusCode::CREATED);

    // pending rows are not friends yet
    let a_friends = get_data(&server, "/api/v1/friends/list", &a_token).await;
    assert_eq!(a_friends["friends"], json!([]));
    let b_friends = get_data(&server, "/api/v1/friends/list", &b_token).await;
    assert_eq!(b_friends["friends"], json!([]));

    for (token, other) in [(&a_token, b_id), (&b_token, a_id)] {
        let res = post_json(
            &server,
            &format!("/api/v1/friends/{other}/toggle-debt"),
            token,
            json!({}),
        )
        .await;
        res.assert_status(StatusCode::NOT_FOUND);
    }

    let (k, v) = bearer(&b_token);
    server
        .delete(&format!("/api/v1/friends/{a_id}"))
        .add_header(k, v)
        .await
        .assert_status_ok();

    let a_pending = get_data(&server, "/api/v1/friends/pending", &a_token).await;
    assert_eq!(a_pending, json!({ "sent": [], "received": [] }));
    let b_pending = get_data(&server, "/api/v1/friends/pending", &b_token).await;
    assert_eq!(b_pending, json!({ "sent": [], "received": [] }));

    // the pair is free again
    post_json(&server, "/api/v1/friends/request", &a_token, json!({ "phone": "082222222222" }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn name_search_treats_wildcards_literally() {
    let (server, _app) = setup_test_server();
    let (_a_id, a_token) = member(&server, "Ana", "ana@example.com", "081111111111").await;
    member(&server, "Budi", "budi@example.com", "082222222222").await;

    for query in ["name=%25", "name=_", "q=a%25"] {
        let (k, v) = bearer(&a_token);
        server
            .get(&format!("/api/v1/friends/search?{query}"))
            .add_header(k, v)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
