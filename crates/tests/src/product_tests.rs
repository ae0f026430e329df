use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn any_participant_can_add_a_product() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("addprod").await;

    let resp = app
        .auth_post(
            &format!("/api/party/{}/product", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({
            "title": "Wool sweater",
            "price": 34.5,
            "images": ["https://cdn.test/sweater.jpg"],
            "vendor": "Knits & Co",
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let json: Value = resp.json().await.unwrap();
    let products = json["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["title"], "Wool sweater");
    assert_eq!(products[0]["price"], 34.5);
    assert_eq!(products[0]["added_by"], squad.member.id.as_str());
    assert_eq!(products[0]["added_by_name"], squad.member.display_name.as_str());
}

#[tokio::test]
async fn freeform_product_requires_title_and_price() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("prodval").await;

    let resp = app
        .auth_post(
            &format!("/api/party/{}/product", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({ "price": 10.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_post(
            &format!("/api/party/{}/product", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({ "title": "Hat", "price": -1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn catalog_add_copies_entry_fields() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("catadd").await;
    app.make_admin(&squad.organizer.id).await;

    let resp = app
        .auth_put("/api/catalog", &squad.organizer.access_token)
        .json(&serde_json::json!({ "items": [{
            "id": "tee-001",
            "title": "Graphic tee",
            "handle": "graphic-tee",
            "vendor": "Print Shop",
            "product_type": "shirt",
            "base_price": 19.9,
            "images": ["https://cdn.test/tee.jpg"],
            "variants": [
                { "size": "M", "color": "black", "price": 21.9 },
                { "size": "L", "color": "black", "price": 22.9 },
            ],
        }]}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_post(
            &format!("/api/party/{}/product", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({
            "catalog_id": "tee-001",
            "selected_variant": { "size": "L", "color": "black" },
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let json: Value = resp.json().await.unwrap();
    let product = &json["products"][0];
    assert_eq!(product["title"], "Graphic tee");
    assert_eq!(product["price"], 22.9);
    assert_eq!(product["vendor"], "Print Shop");
    assert_eq!(product["selected_variant"]["size"], "L");
}

#[tokio::test]
async fn catalog_add_unknown_entry_is_404() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("catmiss").await;

    let resp = app
        .auth_post(
            &format!("/api/party/{}/product", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({ "catalog_id": "nope-404" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn only_adder_or_organizer_can_remove_a_product() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("rmprod").await;
    let other = app
        .register_user("third@rmprod.test", "rmprod_third", "Third", "Password123!")
        .await;
    app.auth_post(&format!("/api/party/{}/join", squad.party_id), &other.access_token)
        .send()
        .await
        .unwrap();

    let product_id = app
        .add_product(&squad.party_id, &squad.member.access_token, "Belt", 15.0)
        .await;

    // Unrelated participant cannot remove it
    let resp = app
        .auth_delete(
            &format!("/api/party/{}/product/{}", squad.party_id, product_id),
            &other.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // The organizer can
    let resp = app
        .auth_delete(
            &format!("/api/party/{}/product/{}", squad.party_id, product_id),
            &squad.organizer.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert!(json["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reactions_toggle_and_replace() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("react").await;
    let product_id = app
        .add_product(&squad.party_id, &squad.organizer.access_token, "Boots", 80.0)
        .await;
    let react_url = format!(
        "/api/party/{}/product/{}/reaction",
        squad.party_id, product_id
    );

    // Like
    let resp = app
        .auth_post(&react_url, &squad.member.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["products"][0]["reactions"][0]["reaction"], "like");

    // Same reaction again removes it
    let resp = app
        .auth_post(&react_url, &squad.member.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert!(json["products"][0]["reactions"].as_array().unwrap().is_empty());

    // Like then dislike replaces, never stacks
    app.auth_post(&react_url, &squad.member.access_token)
        .json(&serde_json::json!({ "reaction": "like" }))
        .send()
        .await
        .unwrap();
    let resp = app
        .auth_post(&react_url, &squad.member.access_token)
        .json(&serde_json::json!({ "reaction": "dislike" }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let reactions = json["products"][0]["reactions"].as_array().unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0]["reaction"], "dislike");
}

#[tokio::test]
async fn keep_or_return_only_during_trying() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("trying").await;
    let token = &squad.organizer.access_token;
    let product_id = app
        .add_product(&squad.party_id, token, "Leather bag", 120.0)
        .await;
    let status_url = format!(
        "/api/party/{}/product/{}/status",
        squad.party_id, product_id
    );

    // Too early
    let resp = app
        .auth_put(&status_url, token)
        .json(&serde_json::json!({ "status": "kept" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    for status in ["in_payment", "in_preorder", "trying"] {
        app.set_party_status(&squad.party_id, token, status).await;
    }

    // Members do not decide keeps
    let resp = app
        .auth_put(&status_url, &squad.member.access_token)
        .json(&serde_json::json!({ "status": "returned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&status_url, token)
        .json(&serde_json::json!({ "status": "kept" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["products"][0]["status"], "kept");
}

#[tokio::test]
async fn product_changes_blocked_after_organizer_paid() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("frozen").await;
    let token = &squad.organizer.access_token;
    app.add_product(&squad.party_id, token, "Organizer pick", 25.0)
        .await;

    app.set_party_status(&squad.party_id, token, "in_payment").await;

    let resp = app
        .auth_post(&format!("/api/party/{}/payment/capture", squad.party_id), token)
        .json(&serde_json::json!({ "order_id": null }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_post(
            &format!("/api/party/{}/product", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({ "title": "Latecomer", "price": 9.9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
