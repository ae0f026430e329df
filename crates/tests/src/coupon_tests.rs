use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn kickoff_coupon_sets_every_price_to_one_cent() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("kickoff").await;
    app.add_product(&squad.party_id, &squad.organizer.access_token, "Jacket", 59.9)
        .await;
    app.add_product(&squad.party_id, &squad.member.access_token, "Jeans", 39.9)
        .await;

    let resp = app
        .auth_post(
            &format!("/api/party/{}/coupon", squad.party_id),
            &squad.organizer.access_token,
        )
        .json(&serde_json::json!({ "code": "kickoff" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["applied_coupon"], "KICKOFF");
    for product in json["products"].as_array().unwrap() {
        assert_eq!(product["price"], 0.01);
    }
    let originals: Vec<f64> = json["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["original_price"].as_f64().unwrap())
        .collect();
    assert!(originals.contains(&59.9));
    assert!(originals.contains(&39.9));
}

#[tokio::test]
async fn unknown_coupon_changes_nothing() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("badcode").await;
    app.add_product(&squad.party_id, &squad.organizer.access_token, "Jacket", 59.9)
        .await;

    let resp = app
        .auth_post(
            &format!("/api/party/{}/coupon", squad.party_id),
            &squad.organizer.access_token,
        )
        .json(&serde_json::json!({ "code": "FREESTUFF" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_get(&format!("/api/party/{}", squad.party_id), &squad.organizer.access_token)
        .send()
        .await
        .unwrap();
    let party: Value = resp.json().await.unwrap();
    assert!(party["applied_coupon"].is_null());
    assert_eq!(party["products"][0]["price"], 59.9);
}

#[tokio::test]
async fn coupon_applies_only_once() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("twice").await;
    app.add_product(&squad.party_id, &squad.organizer.access_token, "Jacket", 59.9)
        .await;

    let url = format!("/api/party/{}/coupon", squad.party_id);
    let resp = app
        .auth_post(&url, &squad.organizer.access_token)
        .json(&serde_json::json!({ "code": "KICKOFF" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_post(&url, &squad.organizer.access_token)
        .json(&serde_json::json!({ "code": "KICKOFF" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn only_organizer_applies_coupons() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("whoapplies").await;
    app.add_product(&squad.party_id, &squad.member.access_token, "Jeans", 39.9)
        .await;

    let resp = app
        .auth_post(
            &format!("/api/party/{}/coupon", squad.party_id),
            &squad.member.access_token,
        )
        .json(&serde_json::json!({ "code": "KICKOFF" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
