use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn queue_requires_the_moderation_permission() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("muser1", "password123").await;

    let res = app.get_with_token(routes::ADMIN_POSTS, &user).await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");

    let res = app.get_without_token(routes::ADMIN_POSTS).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn queue_lists_pending_posts_oldest_first_and_drains_on_decision() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("mauthor2", "password123").await;
    let admin = app
        .create_user_with_role("mmod2", "password123", "admin")
        .await;

    let first = app.create_post(&author, "Старый черновик").await;
    let second = app.create_post(&author, "Новый черновик").await;

    let res = app.get_with_token(routes::ADMIN_POSTS, &admin).await;
    assert_eq!(res.status, 200);
    let ids: Vec<i64> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first as i64, second as i64]);

    let res = app
        .post_with_token(&routes::moderate(first), &json!({"action": "approve"}), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Approved");

    let res = app.get_with_token(routes::ADMIN_POSTS, &admin).await;
    let ids: Vec<i64> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second as i64]);
}

#[tokio::test]
async fn rejection_is_a_soft_hide() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("mauthor3", "password123").await;
    let stranger = app.create_authenticated_user("mstr3", "password123").await;
    let admin = app
        .create_user_with_role("mmod3", "password123", "admin")
        .await;

    let id = app.create_post(&author, "Не прошло").await;
    let res = app
        .post_with_token(&routes::moderate(id), &json!({"action": "reject"}), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Rejected");

    // Kept, author-visible, absent everywhere else.
    let res = app.get_with_token(&routes::post(id), &author).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Rejected");

    assert_eq!(app.get_with_token(&routes::post(id), &stranger).await.status, 404);

    let feed = app.get_without_token(routes::POSTS).await;
    assert!(feed.body["data"].as_array().unwrap().is_empty());

    let mine = app.get_with_token(routes::MY_POSTS, &author).await;
    assert_eq!(mine.body["data"][0]["status"], "Rejected");
}

#[tokio::test]
async fn a_decided_post_cannot_be_moderated_again() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("mauthor4", "password123").await;
    let admin = app
        .create_user_with_role("mmod4", "password123", "admin")
        .await;

    let id = app.create_approved_post(&author, &admin, "Решено").await;

    let res = app
        .post_with_token(&routes::moderate(id), &json!({"action": "reject"}), &admin)
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn unknown_actions_are_rejected() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("mauthor5", "password123").await;
    let admin = app
        .create_user_with_role("mmod5", "password123", "admin")
        .await;

    let id = app.create_post(&author, "Пост").await;
    let res = app
        .post_with_token(&routes::moderate(id), &json!({"action": "defenestrate"}), &admin)
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
