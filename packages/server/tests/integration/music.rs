use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use crate::common::{TestApp, routes};
use server::entity::music_track_like;

async fn ledger_count(app: &TestApp, track_id: i32) -> u64 {
    music_track_like::Entity::find()
        .filter(music_track_like::Column::TrackId.eq(track_id))
        .count(&app.db)
        .await
        .expect("ledger count failed")
}

#[tokio::test]
async fn search_marks_already_imported_tracks() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser1", "password123").await;

    app.import_track(&token, "1002").await;

    let res = app
        .get_with_token(&format!("{}?q=Степан", routes::MUSIC_SEARCH), &token)
        .await;
    assert_eq!(res.status, 200);
    let hits = res.body.as_array().unwrap();
    assert_eq!(hits.len(), 2);
    for hit in hits {
        let expected = hit["source_id"] == "1002";
        assert_eq!(hit["imported"].as_bool().unwrap(), expected);
    }
}

#[tokio::test]
async fn search_requires_authentication_and_a_query() {
    let app = TestApp::spawn().await;

    let res = app
        .get_without_token(&format!("{}?q=кото", routes::MUSIC_SEARCH))
        .await;
    assert_eq!(res.status, 401);

    let token = app.create_authenticated_user("muser2", "password123").await;
    let res = app
        .get_with_token(&format!("{}?q=%20", routes::MUSIC_SEARCH), &token)
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn import_dedupes_on_source_id() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser3", "password123").await;

    let res = app
        .post_with_token(routes::MUSIC_TRACKS, &json!({"source_id": "1001"}), &token)
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["title"], "Курай моңо");
    let first_id = res.id();

    let res = app
        .post_with_token(routes::MUSIC_TRACKS, &json!({"source_id": "1001"}), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.id(), first_id);

    let list = app.get_without_token(routes::MUSIC_TRACKS).await;
    assert_eq!(list.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn importing_an_unknown_track_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser4", "password123").await;

    let res = app
        .post_with_token(routes::MUSIC_TRACKS, &json!({"source_id": "9999"}), &token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn like_toggle_keeps_the_counter_equal_to_the_ledger() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser5", "password123").await;
    let id = app.import_track(&token, "1001").await;

    let res = app.post_with_token(&routes::track_like(id), &json!({}), &token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["liked"], true);
    assert_eq!(res.body["like_count"], 1);
    assert_eq!(ledger_count(&app, id).await, 1);

    let res = app.post_with_token(&routes::track_like(id), &json!({}), &token).await;
    assert_eq!(res.body["liked"], false);
    assert_eq!(res.body["like_count"], 0);
    assert_eq!(ledger_count(&app, id).await, 0);

    let other = app.create_authenticated_user("muser5b", "password123").await;
    app.post_with_token(&routes::track_like(id), &json!({}), &token).await;
    app.post_with_token(&routes::track_like(id), &json!({}), &other).await;

    let list = app.get_with_token(routes::MUSIC_TRACKS, &token).await;
    let track = &list.body["data"][0];
    assert_eq!(track["likes_count"], 2);
    assert_eq!(track["liked_by_viewer"], true);
    assert_eq!(ledger_count(&app, id).await, 2);
}

#[tokio::test]
async fn popular_sort_uses_the_like_counter() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser6", "password123").await;

    let quiet = app.import_track(&token, "1001").await;
    let hit = app.import_track(&token, "1002").await;

    app.post_with_token(&routes::track_like(hit), &json!({}), &token).await;

    let res = app
        .get_without_token(&format!("{}?sort=popular", routes::MUSIC_TRACKS))
        .await;
    let ids: Vec<i64> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![hit as i64, quiet as i64]);
}

#[tokio::test]
async fn playback_counter_increments_without_auth() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser7", "password123").await;
    let id = app.import_track(&token, "1003").await;

    let res = app.post_without_token(&routes::track_play(id), &json!({})).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["playback_count"], 1);

    let res = app.post_without_token(&routes::track_play(id), &json!({})).await;
    assert_eq!(res.body["playback_count"], 2);
}

#[tokio::test]
async fn liking_an_unknown_track_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("muser8", "password123").await;

    let res = app
        .post_with_token(&routes::track_like(424_242), &json!({}), &token)
        .await;
    assert_eq!(res.status, 404);
}
