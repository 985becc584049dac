use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn public_profile_has_no_private_fields() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("uprofile1", "password123").await;

    let me = app.get_with_token(routes::ME, &token).await;
    let id = me.body["id"].as_i64().unwrap() as i32;

    let res = app.get_without_token(&routes::user(id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["username"], "uprofile1");
    assert!(res.body.get("email").is_none());
    assert!(res.body.get("password").is_none());
    assert!(res.body.get("role").is_none());
}

#[tokio::test]
async fn profile_patch_supports_three_state_updates() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("uprofile2", "password123").await;

    let res = app
        .patch_with_token(
            routes::USERS_ME,
            &json!({
                "display_name": "Зухра",
                "bio": "Люблю вышивку и чак-чак.",
                "region": "Казань",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["display_name"], "Зухра");
    assert_eq!(res.body["bio"], "Люблю вышивку и чак-чак.");

    // Omitted fields stay; null clears.
    let res = app
        .patch_with_token(routes::USERS_ME, &json!({"bio": null}), &token)
        .await;
    assert_eq!(res.status, 200);
    assert!(res.body["bio"].is_null());
    assert_eq!(res.body["display_name"], "Зухра");
    assert_eq!(res.body["region"], "Казань");
}

#[tokio::test]
async fn profile_updates_require_auth_and_valid_input() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("uprofile3", "password123").await;

    let res = app
        .patch_with_token(routes::USERS_ME, &json!({"display_name": "   "}), &token)
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .client
        .patch(format!("http://{}{}", app.addr, routes::USERS_ME))
        .json(&json!({"display_name": "Имя"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn account_deletion_cascades_to_all_owned_content() {
    let app = TestApp::spawn().await;
    let doomed = app.create_authenticated_user("udoomed", "password123").await;
    let admin = app
        .create_user_with_role("umod4", "password123", "admin")
        .await;
    let bystander = app.create_authenticated_user("ubystander", "password123").await;

    // The doomed user owns a post; the bystander likes and comments on it.
    let own_post = app.create_approved_post(&doomed, &admin, "Исчезнет с автором").await;
    app.post_with_token(&routes::post_like(own_post), &json!({}), &bystander).await;
    app.post_with_token(
        &routes::post_comments(own_post),
        &json!({"content": "Хороший пост"}),
        &bystander,
    )
    .await;

    // The doomed user also likes and comments on the bystander's post.
    let other_post = app
        .create_approved_post(&bystander, &admin, "Останется")
        .await;
    app.post_with_token(&routes::post_like(other_post), &json!({}), &doomed).await;
    app.post_with_token(
        &routes::post_comments(other_post),
        &json!({"content": "Уйду вместе с аккаунтом"}),
        &doomed,
    )
    .await;
    app.create_ticket(&doomed, "Забудьте меня").await;

    let res = app.delete_with_token(routes::USERS_ME, &doomed).await;
    assert_eq!(res.status, 204);

    // The owned post and everything under it is gone.
    assert_eq!(app.get_without_token(&routes::post(own_post)).await.status, 404);

    // The bystander's post survives, minus the deleted user's activity.
    let res = app.get_without_token(&routes::post(other_post)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["like_count"], 0);
    assert_eq!(res.body["comment_count"], 0);

    // The account itself is unusable.
    assert_eq!(app.get_with_token(routes::ME, &doomed).await.status, 401);
}

#[tokio::test]
async fn admins_can_list_users_and_grant_roles() {
    let app = TestApp::spawn().await;
    let admin = app
        .create_user_with_role("umod5", "password123", "admin")
        .await;
    let user = app.create_authenticated_user("upromote", "password123").await;

    let res = app
        .get_with_token(&format!("{}?search=upromote", routes::ADMIN_USERS), &admin)
        .await;
    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    let id = data[0]["id"].as_i64().unwrap() as i32;
    assert_eq!(data[0]["role"], "user");

    let res = app
        .patch_with_token(&routes::user_role(id), &json!({"role": "admin"}), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["role"], "admin");

    // Unknown roles are rejected.
    let res = app
        .patch_with_token(&routes::user_role(id), &json!({"role": "tsar"}), &admin)
        .await;
    assert_eq!(res.status, 400);

    // Regular users cannot touch the admin surface.
    let res = app.get_with_token(routes::ADMIN_USERS, &user).await;
    assert_eq!(res.status, 403);
}
