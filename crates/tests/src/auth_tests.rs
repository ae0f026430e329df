use crate::fixtures::test_app::TestApp;
use bson::doc;
use serde_json::Value;
use shopsquad_services::AuthService;

#[tokio::test]
async fn register_creates_user_and_returns_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "alice@test.com",
            "username": "alice",
            "display_name": "Alice",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "alice@test.com");
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["display_name"], "Alice");
    assert_eq!(json["user"]["is_admin"], false);
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let app = TestApp::spawn().await;

    let body = serde_json::json!({
        "email": "dup@test.com",
        "username": "user1",
        "display_name": "User 1",
        "password": "Password123!",
    });

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let mut dup = body.clone();
    dup["username"] = serde_json::json!("user2");
    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&dup)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn register_short_password_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "short@test.com",
            "username": "shorty",
            "display_name": "Shorty",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::spawn().await;
    app.register_user("carol@test.com", "carol", "Carol", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "carol@test.com",
            "password": "WrongPassword!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn login_with_username_works() {
    let app = TestApp::spawn().await;
    app.register_user("dave@test.com", "dave", "Dave", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "username": "dave",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["user"]["email"], "dave@test.com");
}

#[tokio::test]
async fn me_returns_current_user_and_rejects_anonymous() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("eve@test.com", "eve", "Eve", "Password123!")
        .await;

    let resp = app
        .auth_get("/api/auth/me", &user.access_token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], user.id.as_str());

    let resp = reqwest::Client::new()
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn cookie_session_works_without_bearer_header() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("lena@test.com", "lena", "Lena", "Password123!")
        .await;

    // Login stored the access_token cookie in the jar; no Authorization
    // header on this request.
    let resp = app
        .client
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], user.id.as_str());
}

#[tokio::test]
async fn update_me_changes_profile() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("frank@test.com", "frank", "Frank", "Password123!")
        .await;

    let resp = app
        .auth_put("/api/auth/me", &user.access_token)
        .json(&serde_json::json!({
            "display_name": "Franklin",
            "avatar": "https://cdn.test/franklin.png",
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["display_name"], "Franklin");
    assert_eq!(json["avatar"], "https://cdn.test/franklin.png");
}

#[tokio::test]
async fn refresh_returns_new_tokens() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("grace@test.com", "grace", "Grace", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": user.refresh_token }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["username"], "grace");
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("heidi@test.com", "heidi", "Heidi", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": user.access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("ivan@test.com", "ivan", "Ivan", "Password123!")
        .await;

    let resp = app
        .auth_put("/api/auth/password", &user.access_token)
        .json(&serde_json::json!({
            "current_password": "NotThePassword!",
            "new_password": "NewPassword456!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .auth_put("/api/auth/password", &user.access_token)
        .json(&serde_json::json!({
            "current_password": "Password123!",
            "new_password": "NewPassword456!",
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    // Old password is gone, new one works
    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "ivan@test.com",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    app.login_user("ivan@test.com", "NewPassword456!").await;
}

#[tokio::test]
async fn password_reset_flow_sets_new_password() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("judy@test.com", "judy", "Judy", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/password-reset"))
        .json(&serde_json::json!({ "email": "judy@test.com" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["requested"], true);

    // The raw token only travels by email; plant a known one instead.
    let token = "known-reset-token-for-tests";
    let digest = AuthService::reset_token_digest(token);
    let uid = bson::oid::ObjectId::parse_str(&user.id).unwrap();
    app.db
        .collection::<bson::Document>("users")
        .update_one(
            doc! { "_id": uid },
            doc! { "$set": { "password_reset": {
                "token_hash": digest,
                "expires_at": bson::DateTime::from_millis(
                    bson::DateTime::now().timestamp_millis() + 60_000
                ),
            } } },
        )
        .await
        .unwrap();

    let resp = app
        .client
        .post(app.url("/api/auth/password-reset/confirm"))
        .json(&serde_json::json!({
            "token": token,
            "new_password": "ResetPassword789!",
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    app.login_user("judy@test.com", "ResetPassword789!").await;
}

#[tokio::test]
async fn password_reset_confirm_rejects_bad_token() {
    let app = TestApp::spawn().await;
    app.register_user("karl@test.com", "karl", "Karl", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/password-reset/confirm"))
        .json(&serde_json::json!({
            "token": "no-such-token",
            "new_password": "ResetPassword789!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn password_reset_request_does_not_reveal_accounts() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/password-reset"))
        .json(&serde_json::json!({ "email": "nobody@test.com" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["requested"], true);
}
