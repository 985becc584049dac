use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn comments_list_oldest_first_with_author_fields() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("cauthor1", "password123").await;
    let admin = app
        .create_user_with_role("cmod1", "password123", "admin")
        .await;
    let id = app.create_approved_post(&author, &admin, "Обсуждение").await;

    let alice = app.create_authenticated_user("alice_c", "password123").await;
    let bob = app.create_authenticated_user("bob_c", "password123").await;

    let res = app
        .post_with_token(&routes::post_comments(id), &json!({"content": "Первый!"}), &alice)
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["author"]["username"], "alice_c");

    app.post_with_token(&routes::post_comments(id), &json!({"content": "Второй."}), &bob)
        .await;

    let res = app.get_without_token(&routes::post_comments(id)).await;
    assert_eq!(res.status, 200);
    let contents: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["Первый!", "Второй."]);

    let view = app.get_without_token(&routes::post(id)).await;
    assert_eq!(view.body["comment_count"], 2);
}

#[tokio::test]
async fn content_is_trimmed_and_must_not_be_blank() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("cauthor2", "password123").await;
    let admin = app
        .create_user_with_role("cmod2", "password123", "admin")
        .await;
    let id = app.create_approved_post(&author, &admin, "Пост").await;

    let res = app
        .post_with_token(
            &routes::post_comments(id),
            &json!({"content": "  с пробелами  "}),
            &author,
        )
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["content"], "с пробелами");

    let res = app
        .post_with_token(&routes::post_comments(id), &json!({"content": "   "}), &author)
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("cauthor3", "password123").await;
    let admin = app
        .create_user_with_role("cmod3", "password123", "admin")
        .await;
    let id = app.create_approved_post(&author, &admin, "Пост").await;

    let commenter = app.create_authenticated_user("comm3", "password123").await;
    let intruder = app.create_authenticated_user("intr3", "password123").await;

    let res = app
        .post_with_token(&routes::post_comments(id), &json!({"content": "Моё мнение"}), &commenter)
        .await;
    let comment_id = res.id();

    let res = app
        .patch_with_token(
            &routes::comment(comment_id),
            &json!({"content": "Подменено"}),
            &intruder,
        )
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");

    let res = app.delete_with_token(&routes::comment(comment_id), &intruder).await;
    assert_eq!(res.status, 403);

    // Entity unmodified after the forbidden attempts.
    let list = app.get_without_token(&routes::post_comments(id)).await;
    assert_eq!(list.body[0]["content"], "Моё мнение");

    let res = app
        .patch_with_token(
            &routes::comment(comment_id),
            &json!({"content": "Уточнённое мнение"}),
            &commenter,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["content"], "Уточнённое мнение");

    let res = app.delete_with_token(&routes::comment(comment_id), &commenter).await;
    assert_eq!(res.status, 204);

    let list = app.get_without_token(&routes::post_comments(id)).await;
    assert!(list.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn commenting_on_a_missing_post_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("cauthor4", "password123").await;

    let res = app
        .post_with_token(&routes::post_comments(999_999), &json!({"content": "Эй"}), &token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn editing_a_missing_comment_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("cauthor5", "password123").await;

    let res = app
        .patch_with_token(&routes::comment(999_999), &json!({"content": "Эй"}), &token)
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
