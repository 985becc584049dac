use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn full_ticket_lifecycle() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("suser1", "password123").await;
    let admin = app
        .create_user_with_role("smod1", "password123", "admin")
        .await;

    // Submit: pending, unread for the admin, read for the author.
    let res = app
        .post_with_token(
            routes::TICKETS,
            &json!({"subject": "Не работает поиск", "message": "Поиск по музыке виснет."}),
            &user,
        )
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["status"], "Pending");
    assert_eq!(res.body["is_read_by_admin"], false);
    assert_eq!(res.body["is_read_by_user"], true);
    let id = res.id();

    // Answer: status, text, timestamp, and a fresh unread flag for the user.
    let res = app
        .post_with_token(
            &routes::ticket_answer(id),
            &json!({"answer": "Починили, обновите страницу."}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Answered");
    assert_eq!(res.body["answer"], "Починили, обновите страницу.");
    assert!(res.body["answered_at"].is_string());
    assert_eq!(res.body["is_read_by_user"], false);

    // The user reads the answer.
    let res = app.post_with_token(&routes::ticket_read(id), &json!({}), &user).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["is_read_by_user"], true);

    // The user closes; closed is terminal.
    let res = app.post_with_token(&routes::ticket_close(id), &json!({}), &user).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Closed");

    let res = app
        .post_with_token(&routes::ticket_answer(id), &json!({"answer": "Ещё раз"}), &admin)
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn a_pending_ticket_can_be_withdrawn() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("suser2", "password123").await;

    let id = app.create_ticket(&user, "Передумал").await;

    let res = app.post_with_token(&routes::ticket_close(id), &json!({}), &user).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Closed");

    let res = app.post_with_token(&routes::ticket_close(id), &json!({}), &user).await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn answering_twice_is_a_conflict() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("suser3", "password123").await;
    let admin = app
        .create_user_with_role("smod3", "password123", "admin")
        .await;

    let id = app.create_ticket(&user, "Вопрос").await;
    let res = app
        .post_with_token(&routes::ticket_answer(id), &json!({"answer": "Ответ"}), &admin)
        .await;
    assert_eq!(res.status, 200);

    let res = app
        .post_with_token(&routes::ticket_answer(id), &json!({"answer": "Другой ответ"}), &admin)
        .await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn tickets_are_private_to_owner_and_support() {
    let app = TestApp::spawn().await;
    let owner = app.create_authenticated_user("sowner4", "password123").await;
    let stranger = app.create_authenticated_user("sstr4", "password123").await;
    let admin = app
        .create_user_with_role("smod4", "password123", "admin")
        .await;

    let id = app.create_ticket(&owner, "Личное").await;

    assert_eq!(app.get_with_token(&routes::ticket(id), &owner).await.status, 200);
    assert_eq!(app.get_with_token(&routes::ticket(id), &admin).await.status, 200);

    let res = app.get_with_token(&routes::ticket(id), &stranger).await;
    assert_eq!(res.status, 403);

    // Answering requires support:manage.
    let res = app
        .post_with_token(&routes::ticket_answer(id), &json!({"answer": "Хак"}), &stranger)
        .await;
    assert_eq!(res.status, 403);

    // Closing someone else's ticket is forbidden too.
    let res = app
        .post_with_token(&routes::ticket_close(id), &json!({}), &stranger)
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn unread_badges_are_derived_per_side() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("suser5", "password123").await;
    let admin = app
        .create_user_with_role("smod5", "password123", "admin")
        .await;

    let first = app.create_ticket(&user, "Первый").await;
    app.create_ticket(&user, "Второй").await;

    // Two fresh tickets: both unread for the admin, none for the user.
    let res = app.get_with_token(routes::UNREAD_COUNT, &admin).await;
    assert_eq!(res.body["unread"], 2);
    let res = app.get_with_token(routes::UNREAD_COUNT, &user).await;
    assert_eq!(res.body["unread"], 0);

    // Admin reads one; an answer makes it unread for the user.
    app.post_with_token(&routes::ticket_read(first), &json!({}), &admin).await;
    let res = app.get_with_token(routes::UNREAD_COUNT, &admin).await;
    assert_eq!(res.body["unread"], 1);

    app.post_with_token(&routes::ticket_answer(first), &json!({"answer": "Готово"}), &admin)
        .await;
    let res = app.get_with_token(routes::UNREAD_COUNT, &user).await;
    assert_eq!(res.body["unread"], 1);

    app.post_with_token(&routes::ticket_read(first), &json!({}), &user).await;
    let res = app.get_with_token(routes::UNREAD_COUNT, &user).await;
    assert_eq!(res.body["unread"], 0);
}

#[tokio::test]
async fn admin_listing_includes_submitter_and_filters_by_status() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("suser6", "password123").await;
    let admin = app
        .create_user_with_role("smod6", "password123", "admin")
        .await;

    let first = app.create_ticket(&user, "Останется открытым").await;
    let second = app.create_ticket(&user, "Будет закрыт").await;
    app.post_with_token(&routes::ticket_close(second), &json!({}), &user).await;

    let res = app
        .get_with_token(&format!("{}?status=Pending", routes::ADMIN_TICKETS), &admin)
        .await;
    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], first);
    assert_eq!(data[0]["user"]["username"], "suser6");

    let res = app
        .get_with_token(&format!("{}?status=Bogus", routes::ADMIN_TICKETS), &admin)
        .await;
    assert_eq!(res.status, 400);

    let res = app.get_with_token(routes::ADMIN_TICKETS, &user).await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn contact_form_accepts_anonymous_messages() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(
            routes::CONTACT,
            &json!({
                "name": "Гость",
                "email": "guest@example.org",
                "message": "Спасибо за сайт!",
            }),
        )
        .await;
    assert_eq!(res.status, 202);

    // Nothing persisted: the ticket table is untouched.
    let admin = app
        .create_user_with_role("smod7", "password123", "admin")
        .await;
    let res = app.get_with_token(routes::ADMIN_TICKETS, &admin).await;
    assert!(res.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn contact_form_validates_input() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(
            routes::CONTACT,
            &json!({"name": "", "email": "guest@example.org", "message": "Привет"}),
        )
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .post_without_token(
            routes::CONTACT,
            &json!({"name": "Гость", "email": "no-at-sign", "message": "Привет"}),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn ticket_subject_must_not_be_blank() {
    let app = TestApp::spawn().await;
    let user = app.create_authenticated_user("suser8", "password123").await;

    let res = app
        .post_with_token(
            routes::TICKETS,
            &json!({"subject": "   ", "message": "Текст"}),
            &user,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
