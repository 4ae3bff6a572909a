use crate::common::{TestApp, routes};
use serde_json::json;

mod signup {
    use super::*;

    #[tokio::test]
    async fn new_user_receives_token_and_profile() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"name": "Ada Lovelace", "email": "Ada@Example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["token"].as_str().is_some());
        assert_eq!(res.body["user"]["email"], "ada@example.com");
        assert_eq!(res.body["user"]["role"], "user");
        assert_eq!(res.body["user"]["creator"], false);
        assert!(res.body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.signup("First", "dup@example.com").await;

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"name": "Second", "email": "DUP@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn invalid_fields_are_all_reported() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"name": "A", "email": "not-an-email", "password": "123"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        let fields: Vec<&str> = res.body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn correct_password_returns_token() {
        let app = TestApp::spawn().await;
        app.signup("Grace", "grace@example.com").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "grace@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].as_str().is_some());
        assert!(res.body["user"]["lastLogin"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let app = TestApp::spawn().await;
        app.signup("Grace", "grace@example.com").await;

        let wrong = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "grace@example.com", "password": "nope-nope"}),
            )
            .await;
        let unknown = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(wrong.status, 401);
        assert_eq!(unknown.status, 401);
        assert_eq!(wrong.body["code"], "INVALID_CREDENTIALS");
        assert_eq!(wrong.body, unknown.body);
    }
}

mod session {
    use super::*;

    #[tokio::test]
    async fn me_returns_the_caller() {
        let app = TestApp::spawn().await;
        let user = app.signup("Linus", "linus@example.com").await;

        let res = app.get_with_token(routes::ME, &user.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], user.id);
        assert_eq!(res.body["name"], "Linus");
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod usernames {
    use super::*;

    #[tokio::test]
    async fn availability_reflects_existing_creators() {
        let app = TestApp::spawn().await;
        app.create_creator("pixelsmith").await;

        let taken = app
            .get_without_token(&routes::check_username("PixelSmith"))
            .await;
        let free = app
            .get_without_token(&routes::check_username("someone_else"))
            .await;

        assert_eq!(taken.status, 200);
        assert_eq!(taken.body["available"], false);
        assert_eq!(free.body["available"], true);
    }

    #[tokio::test]
    async fn profile_update_cannot_take_a_used_username() {
        let app = TestApp::spawn().await;
        app.create_creator("pixelsmith").await;
        let other = app.signup("Other", "other@example.com").await;

        let form = reqwest::multipart::Form::new().text("username", "pixelsmith");
        let res = app
            .send_multipart(reqwest::Method::PUT, routes::PROFILE, form, &other.token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }
}

mod profile {
    use super::*;
    use crate::common::png_bytes;
    use reqwest::multipart::{Form, Part};

    #[tokio::test]
    async fn text_fields_update_and_blank_fields_clear() {
        let app = TestApp::spawn().await;
        let user = app.signup("Before", "profile@example.com").await;

        let form = Form::new()
            .text("name", "After")
            .text("location", "Lisbon");
        let res = app
            .send_multipart(reqwest::Method::PUT, routes::PROFILE, form, &user.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "After");
        assert_eq!(res.body["location"], "Lisbon");

        let form = Form::new().text("location", "");
        let res = app
            .send_multipart(reqwest::Method::PUT, routes::PROFILE, form, &user.token)
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["location"].is_null());
        assert_eq!(res.body["name"], "After");
    }

    #[tokio::test]
    async fn uploaded_picture_is_stored_and_removable() {
        let app = TestApp::spawn().await;
        let user = app.signup("Pic", "pic@example.com").await;

        let part = Part::bytes(png_bytes(40, 20))
            .file_name("me.png")
            .mime_str("image/png")
            .unwrap();
        let form = Form::new().part("profileImage", part);
        let res = app
            .send_multipart(reqwest::Method::PUT, routes::PROFILE, form, &user.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let name = res.body["profileImage"].as_str().unwrap().to_string();
        assert!(name.starts_with("profile-"));
        assert!(name.ends_with(".jpg"));

        let image = app.get_raw(&routes::image(&name), None).await;
        assert_eq!(image.status(), 200);
        assert_eq!(image.headers()["content-type"], "image/jpeg");

        let res = app.delete_with_token(routes::PROFILE_IMAGE, &user.token).await;
        assert_eq!(res.status, 200);
        assert!(res.body["profileImage"].is_null());
    }

    #[tokio::test]
    async fn non_image_picture_is_rejected() {
        let app = TestApp::spawn().await;
        let user = app.signup("Pic", "pic@example.com").await;

        let part = Part::bytes(b"%PDF-1.4".to_vec())
            .file_name("me.pdf")
            .mime_str("application/pdf")
            .unwrap();
        let form = Form::new().part("profileImage", part);
        let res = app
            .send_multipart(reqwest::Method::PUT, routes::PROFILE, form, &user.token)
            .await;

        assert_eq!(res.status, 400);
        assert!(app.stored_files().is_empty());
    }
}
