use crate::fixtures::test_app::TestApp;
use serde_json::Value;

fn sample_items() -> Value {
    serde_json::json!([
        {
            "id": "tee-001",
            "title": "Graphic tee",
            "handle": "graphic-tee",
            "vendor": "Print Shop",
            "product_type": "shirt",
            "base_price": 19.9,
            "images": [],
            "variants": [{ "size": "M", "color": "black", "price": 21.9 }],
        },
        {
            "id": "cap-002",
            "title": "Baseball cap",
            "handle": "baseball-cap",
            "base_price": 12.5,
        },
    ])
}

#[tokio::test]
async fn replace_requires_admin() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("pleb@cat.test", "cat_pleb", "Pleb", "Password123!")
        .await;

    let resp = app
        .auth_put("/api/catalog", &user.access_token)
        .json(&serde_json::json!({ "items": sample_items() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_replaces_and_everyone_reads() {
    let app = TestApp::spawn().await;
    let admin = app
        .register_user("admin@cat.test", "cat_admin", "Admin", "Password123!")
        .await;
    let user = app
        .register_user("user@cat.test", "cat_user", "User", "Password123!")
        .await;
    app.make_admin(&admin.id).await;

    let resp = app
        .auth_put("/api/catalog", &admin.access_token)
        .json(&serde_json::json!({ "items": sample_items() }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["count"], 2);

    let resp = app
        .auth_get("/api/catalog", &user.access_token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let items: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "tee-001");
}

#[tokio::test]
async fn replace_overwrites_previous_import() {
    let app = TestApp::spawn().await;
    let admin = app
        .register_user("admin@cat2.test", "cat2_admin", "Admin", "Password123!")
        .await;
    app.make_admin(&admin.id).await;

    app.auth_put("/api/catalog", &admin.access_token)
        .json(&serde_json::json!({ "items": sample_items() }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_put("/api/catalog", &admin.access_token)
        .json(&serde_json::json!({ "items": [{
            "id": "only-one",
            "title": "Lone item",
            "handle": "lone-item",
            "base_price": 5.0,
        }]}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get("/api/catalog", &admin.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "only-one");
}

#[tokio::test]
async fn clear_leaves_an_empty_catalog() {
    let app = TestApp::spawn().await;
    let admin = app
        .register_user("admin@cat3.test", "cat3_admin", "Admin", "Password123!")
        .await;
    app.make_admin(&admin.id).await;

    app.auth_put("/api/catalog", &admin.access_token)
        .json(&serde_json::json!({ "items": sample_items() }))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_delete("/api/catalog", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get("/api/catalog", &admin.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn catalog_read_requires_auth() {
    let app = TestApp::spawn().await;

    let resp = reqwest::Client::new()
        .get(app.url("/api/catalog"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}
