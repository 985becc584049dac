use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn catalog_is_served_and_tolerates_unknown_slugs() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::GROUPS).await;
    assert_eq!(res.status, 200);
    let slugs: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap())
        .collect();
    assert!(slugs.contains(&"tatars"));
    assert!(slugs.contains(&"nenets"));

    let res = app.get_without_token(&routes::group("sakha")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"], "Якуты (саха)");

    let res = app.get_without_token(&routes::group("atlantis")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn quiz_is_served_without_correct_answers() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::group_quiz("tatars")).await;
    assert_eq!(res.status, 200);
    let questions = res.body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    for q in questions {
        assert!(q["prompt"].is_string());
        assert!(q["options"].as_array().unwrap().len() >= 2);
        assert!(q.get("correct").is_none(), "correct index must not leak");
    }
}

#[tokio::test]
async fn groups_without_a_bank_have_no_quiz() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::group_quiz("komi")).await;
    assert_eq!(res.status, 404);

    let res = app.get_without_token(&routes::group_quiz("atlantis")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn submitting_grades_server_side_and_upserts_the_attempt() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("quiz1", "password123").await;

    // Correct answers for the tatars bank: Сабантуй, Эчпочмак, Сююмбике.
    let res = app
        .post_with_token(
            &routes::group_quiz("tatars"),
            &json!({"answers": [0, 1, 2]}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["score"], 3);
    assert_eq!(res.body["total"], 3);
    assert_eq!(res.body["correct"], json!([true, true, true]));

    // Resubmitting replaces the stored attempt instead of adding a row.
    let res = app
        .post_with_token(
            &routes::group_quiz("tatars"),
            &json!({"answers": [0, 0, 0]}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["score"], 1);

    let res = app.get_with_token(routes::QUIZ_RESULTS, &token).await;
    assert_eq!(res.status, 200);
    let attempts = res.body.as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["group_id"], "tatars");
    assert_eq!(attempts[0]["group_name"], "Татары");
    assert_eq!(attempts[0]["score"], 1);
    assert_eq!(attempts[0]["completed"], true);
}

#[tokio::test]
async fn answer_sheet_length_must_match_the_bank() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("quiz2", "password123").await;

    let res = app
        .post_with_token(&routes::group_quiz("tatars"), &json!({"answers": [0]}), &token)
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn submitting_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(&routes::group_quiz("tatars"), &json!({"answers": [0, 1, 2]}))
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn results_are_per_user() {
    let app = TestApp::spawn().await;
    let first = app.create_authenticated_user("quiz3a", "password123").await;
    let second = app.create_authenticated_user("quiz3b", "password123").await;

    app.post_with_token(
        &routes::group_quiz("nenets"),
        &json!({"answers": [2, 1, 2]}),
        &first,
    )
    .await;

    let res = app.get_with_token(routes::QUIZ_RESULTS, &second).await;
    assert!(res.body.as_array().unwrap().is_empty());

    let res = app.get_with_token(routes::QUIZ_RESULTS, &first).await;
    assert_eq!(res.body.as_array().unwrap().len(), 1);
    assert_eq!(res.body[0]["score"], 3);
}
