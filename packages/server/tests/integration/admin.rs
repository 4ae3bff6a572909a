use crate::common::{TestApp, routes};
use serde_json::json;

mod users {
    use super::*;

    #[tokio::test]
    async fn listing_searches_name_email_and_username() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;
        app.signup("Alice Smith", "alice@example.com").await;
        app.signup("Bob Jones", "bob@example.com").await;
        app.create_creator("smithy").await;

        let res = app
            .get_with_token(&format!("{}?search=SMITH", routes::ADMIN_USERS), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let users = res.body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(res.body["pagination"]["total"], 2);
        assert!(users.iter().all(|u| u.get("password").is_none()));

        let res = app.get_with_token(routes::ADMIN_USERS, &admin.token).await;
        assert_eq!(res.body["pagination"]["total"], 4);
    }

    #[tokio::test]
    async fn regular_users_are_forbidden() {
        let app = TestApp::spawn().await;
        let user = app.signup("Plain", "plain@example.com").await;

        let res = app.get_with_token(routes::ADMIN_USERS, &user.token).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app.get_with_token(routes::ADMIN_ASSETS, &user.token).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn role_can_be_granted() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;
        let user = app.signup("Promoted", "promoted@example.com").await;

        let res = app
            .put_with_token(
                &routes::admin_user_role(user.id),
                &json!({"role": "admin"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "admin");

        let res = app.get_with_token(routes::ADMIN_USERS, &user.token).await;
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn admins_cannot_demote_themselves() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;

        let res = app
            .put_with_token(
                &routes::admin_user_role(admin.id),
                &json!({"role": "user"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;

        let res = app
            .delete_with_token(&routes::admin_user(admin.id), &admin.token)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn deleting_a_creator_removes_assets_and_files() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Gone Soon", "Logo").await;
        app.upload_asset(&creator.token, "Also Gone", "Logo").await;
        assert_eq!(app.stored_files().len(), 4);

        let res = app
            .delete_with_token(&routes::admin_user(creator.id), &admin.token)
            .await;
        assert_eq!(res.status, 204);

        assert!(app.stored_files().is_empty());
        let res = app.get_without_token(&routes::public_asset(id)).await;
        assert_eq!(res.status, 404);
        let res = app.get_with_token(routes::ME, &creator.token).await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;

        let res = app
            .delete_with_token(&routes::admin_user(987_654), &admin.token)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod assets {
    use super::*;

    #[tokio::test]
    async fn listing_includes_drafts_and_filters() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;
        let creator = app.create_creator("neon").await;
        let draft = app.upload_asset(&creator.token, "Retro Draft", "Logo").await;
        app.upload_asset(&creator.token, "Modern Mockup", "Mockup").await;
        app.put_with_token(&routes::asset(draft), &json!({"status": "draft"}), &creator.token)
            .await;

        let res = app.get_with_token(routes::ADMIN_ASSETS, &admin.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);

        let res = app
            .get_with_token(&format!("{}?status=draft", routes::ADMIN_ASSETS), &admin.token)
            .await;
        assert_eq!(res.body["assets"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["assets"][0]["id"], draft);

        let res = app
            .get_with_token(&format!("{}?category=Mockup", routes::ADMIN_ASSETS), &admin.token)
            .await;
        assert_eq!(res.body["assets"][0]["title"], "Modern Mockup");

        let res = app
            .get_with_token(&format!("{}?search=retro", routes::ADMIN_ASSETS), &admin.token)
            .await;
        // Tags of every uploaded asset contain "retro".
        assert_eq!(res.body["pagination"]["total"], 2);

        let res = app
            .get_with_token(&format!("{}?status=deleted", routes::ADMIN_ASSETS), &admin.token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn admin_can_moderate_any_asset() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root@example.com").await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Questionable", "Logo").await;

        let res = app
            .put_with_token(
                &routes::admin_asset(id),
                &json!({"status": "archived"}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "archived");

        let res = app.delete_with_token(&routes::admin_asset(id), &admin.token).await;
        assert_eq!(res.status, 204);
        assert!(app.stored_files().is_empty());
    }
}
