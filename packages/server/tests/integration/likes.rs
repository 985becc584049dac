use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use crate::common::{TestApp, routes};
use server::entity::post_like;

async fn ledger_count(app: &TestApp, post_id: i32) -> u64 {
    post_like::Entity::find()
        .filter(post_like::Column::PostId.eq(post_id))
        .count(&app.db)
        .await
        .expect("ledger count failed")
}

#[tokio::test]
async fn toggle_flips_state_and_recounts_from_the_ledger() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("lauthor1", "password123").await;
    let admin = app
        .create_user_with_role("lmod1", "password123", "admin")
        .await;
    let liker = app.create_authenticated_user("lliker1", "password123").await;

    let id = app.create_approved_post(&author, &admin, "Лайкни меня").await;

    let res = app.post_with_token(&routes::post_like(id), &json!({}), &liker).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["liked"], true);
    assert_eq!(res.body["like_count"], 1);
    assert_eq!(ledger_count(&app, id).await, 1);

    // Toggling twice returns to the original state and count.
    let res = app.post_with_token(&routes::post_like(id), &json!({}), &liker).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["liked"], false);
    assert_eq!(res.body["like_count"], 0);
    assert_eq!(ledger_count(&app, id).await, 0);
}

#[tokio::test]
async fn count_tracks_the_ledger_across_many_users() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("lauthor2", "password123").await;
    let admin = app
        .create_user_with_role("lmod2", "password123", "admin")
        .await;
    let id = app.create_approved_post(&author, &admin, "Народный пост").await;

    for i in 0..4 {
        let token = app
            .create_authenticated_user(&format!("lliker2_{i}"), "password123")
            .await;
        let res = app.post_with_token(&routes::post_like(id), &json!({}), &token).await;
        assert_eq!(res.body["like_count"], i + 1);
    }

    assert_eq!(ledger_count(&app, id).await, 4);

    let view = app.get_without_token(&routes::post(id)).await;
    assert_eq!(view.body["like_count"], 4);
}

#[tokio::test]
async fn liking_requires_authentication() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("lauthor3", "password123").await;
    let admin = app
        .create_user_with_role("lmod3", "password123", "admin")
        .await;
    let id = app.create_approved_post(&author, &admin, "Без анонимов").await;

    let res = app.post_without_token(&routes::post_like(id), &json!({})).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}

#[tokio::test]
async fn pending_posts_cannot_be_liked() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("lauthor4", "password123").await;
    let liker = app.create_authenticated_user("lliker4", "password123").await;

    let id = app.create_post(&author, "Ещё на модерации").await;

    let res = app.post_with_token(&routes::post_like(id), &json!({}), &liker).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn deleting_the_post_empties_its_ledger() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("lauthor5", "password123").await;
    let admin = app
        .create_user_with_role("lmod5", "password123", "admin")
        .await;
    let liker = app.create_authenticated_user("lliker5", "password123").await;

    let id = app.create_approved_post(&author, &admin, "Исчезнет").await;
    app.post_with_token(&routes::post_like(id), &json!({}), &liker).await;
    assert_eq!(ledger_count(&app, id).await, 1);

    let res = app.delete_with_token(&routes::post(id), &author).await;
    assert_eq!(res.status, 204);
    assert_eq!(ledger_count(&app, id).await, 0);
}
