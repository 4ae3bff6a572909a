use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use crate::common::{TestApp, png_bytes, routes};
use serde_json::json;

#[tokio::test]
async fn promotion_sets_creator_profile() {
    let app = TestApp::spawn().await;
    let user = app.signup("Plain User", "plain@example.com").await;

    let res = app
        .post_with_token(
            routes::BE_A_CREATOR,
            &json!({
                "creatorName": "Neon Works",
                "username": "Neon_Works",
                "location": "Berlin",
                "bio": "Retro logos",
            }),
            &user.token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["creator"], true);
    assert_eq!(res.body["name"], "Neon Works");
    assert_eq!(res.body["username"], "neon_works");
    assert_eq!(res.body["location"], "Berlin");

    let me = app.get_with_token(routes::ME, &user.token).await;
    assert_eq!(me.body["creator"], true);
}

#[tokio::test]
async fn data_url_picture_is_processed() {
    let app = TestApp::spawn().await;
    let user = app.signup("Plain User", "plain@example.com").await;
    let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(30, 30)));

    let res = app
        .post_with_token(
            routes::BE_A_CREATOR,
            &json!({"creatorName": "Neon Works", "username": "neon", "profileImage": data_url}),
            &user.token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let name = res.body["profileImage"].as_str().unwrap();
    assert!(name.ends_with(".jpg"));
    assert_eq!(app.stored_files(), vec![name.to_string()]);
}

#[tokio::test]
async fn taken_username_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_creator("neon").await;
    let user = app.signup("Plain User", "plain@example.com").await;

    let res = app
        .post_with_token(
            routes::BE_A_CREATOR,
            &json!({"creatorName": "Copycat", "username": "NEON"}),
            &user.token,
        )
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "USERNAME_TAKEN");
}

#[tokio::test]
async fn invalid_username_characters_are_rejected() {
    let app = TestApp::spawn().await;
    let user = app.signup("Plain User", "plain@example.com").await;

    let res = app
        .post_with_token(
            routes::BE_A_CREATOR,
            &json!({"creatorName": "Neon Works", "username": "neon works!"}),
            &user.token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["errors"][0]["field"], "username");
}

#[tokio::test]
async fn garbage_picture_leaves_no_files_behind() {
    let app = TestApp::spawn().await;
    let user = app.signup("Plain User", "plain@example.com").await;
    let data_url = format!("data:image/png;base64,{}", STANDARD.encode(b"not really a png"));

    let res = app
        .post_with_token(
            routes::BE_A_CREATOR,
            &json!({"creatorName": "Neon Works", "username": "neon", "profileImage": data_url}),
            &user.token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert!(app.stored_files().is_empty());
    let me = app.get_with_token(routes::ME, &user.token).await;
    assert_eq!(me.body["creator"], false);
}
