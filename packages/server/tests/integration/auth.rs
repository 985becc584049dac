use serde_json::json;

use crate::common::{TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn register_creates_an_account() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "marat",
                    "email": "marat@example.org",
                    "password": "password123",
                    "display_name": "Марат",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["username"], "marat");
        assert!(res.body["id"].is_number());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("taken", "password123").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "taken",
                    "email": "other@example.org",
                    "password": "password123",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn invalid_payloads_are_rejected() {
        let app = TestApp::spawn().await;

        // Bad username characters.
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "has spaces",
                    "email": "a@b.cd",
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        // Short password.
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "fine",
                    "email": "a@b.cd",
                    "password": "short",
                }),
            )
            .await;
        assert_eq!(res.status, 400);

        // Email without an @.
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "fine2",
                    "email": "not-an-email",
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(res.status, 400);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("vera", "password123").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "vera", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "ghost", "password": "password123"}),
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn admin_login_carries_permissions() {
        let app = TestApp::spawn().await;
        app.create_user_with_role("chief", "password123", "admin")
            .await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "chief", "password": "password123"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "admin");
        let perms: Vec<&str> = res.body["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p.as_str().unwrap())
            .collect();
        assert!(perms.contains(&"post:moderate"));
        assert!(perms.contains(&"support:manage"));
        assert!(perms.contains(&"user:manage"));
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn me_echoes_claims() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("nailya", "password123").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "nailya");
        assert_eq!(res.body["role"], "user");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn malformed_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
