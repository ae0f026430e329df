use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn invite_n_times(app: &TestApp, squad: &crate::fixtures::seed::SeededSquad, email: &str, n: usize) {
    for _ in 0..n {
        let resp = app
            .auth_post(
                &format!("/api/party/{}/invite", squad.party_id),
                &squad.organizer.access_token,
            )
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }
}

#[tokio::test]
async fn notifications_accumulate_newest_first() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("stack").await;
    let target = app
        .register_user("target@stack.test", "stack_target", "Target", "Password123!")
        .await;

    invite_n_times(&app, &squad, "target@stack.test", 3).await;

    let resp = app
        .auth_get("/api/notification", &target.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|n| n["kind"] == "invite"));
    assert!(items.iter().all(|n| n["read"] == false));
}

#[tokio::test]
async fn mark_read_flags_a_single_notification() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("markone").await;
    let target = app
        .register_user("target@markone.test", "markone_target", "Target", "Password123!")
        .await;
    invite_n_times(&app, &squad, "target@markone.test", 2).await;

    let resp = app
        .auth_get("/api/notification", &target.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    let first_id = items[0]["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_put(
            &format!("/api/notification/{}/read", first_id),
            &target.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get("/api/notification", &target.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    let read_count = items.iter().filter(|n| n["read"] == true).count();
    assert_eq!(read_count, 1);
    assert_eq!(
        items.iter().find(|n| n["id"] == first_id.as_str()).unwrap()["read"],
        true
    );
}

#[tokio::test]
async fn mark_read_unknown_id_is_404() {
    let app = TestApp::spawn().await;

    // No notification document at all
    let lonely = app
        .register_user("lonely@read.test", "read_lonely", "Lonely", "Password123!")
        .await;
    let resp = app
        .auth_put("/api/notification/not-a-real-id/read", &lonely.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // Document exists but no item carries that id
    let squad = app.seed_squad("unknownid").await;
    let target = app
        .register_user("target@unknownid.test", "unknownid_target", "Target", "Password123!")
        .await;
    invite_n_times(&app, &squad, "target@unknownid.test", 1).await;

    let resp = app
        .auth_put("/api/notification/not-a-real-id/read", &target.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn mark_all_read_flags_everything() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("markall").await;
    let target = app
        .register_user("target@markall.test", "markall_target", "Target", "Password123!")
        .await;
    invite_n_times(&app, &squad, "target@markall.test", 3).await;

    let resp = app
        .auth_put("/api/notification/read-all", &target.access_token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get("/api/notification", &target.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    assert!(items.iter().all(|n| n["read"] == true));
}

#[tokio::test]
async fn clear_empties_the_list() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("clear").await;
    let target = app
        .register_user("target@clear.test", "clear_target", "Target", "Password123!")
        .await;
    invite_n_times(&app, &squad, "target@clear.test", 2).await;

    let resp = app
        .auth_delete("/api/notification", &target.access_token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get("/api/notification", &target.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn notifications_are_private_to_their_recipient() {
    let app = TestApp::spawn().await;
    let squad = app.seed_squad("private").await;
    let target = app
        .register_user("target@private.test", "private_target", "Target", "Password123!")
        .await;
    invite_n_times(&app, &squad, "target@private.test", 1).await;

    let resp = app
        .auth_get("/api/notification", &squad.member.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    assert!(items.is_empty());
}
