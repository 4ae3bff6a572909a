use crate::common::{TestApp, asset_form, png_part, routes, zip_part, MAX_MAIN_FILE};
use reqwest::Method;
use serde_json::json;

mod upload {
    use super::*;

    #[tokio::test]
    async fn creator_upload_stores_files_and_metadata() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;

        let form = asset_form("Neon Logo Pack", "Logo")
            .part("mainFile", zip_part("Neon Pack.zip", b"PK\x03\x04 logos".to_vec()))
            .part("coverImages", png_part("a.png"))
            .part("coverImages", png_part("b.png"));
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &creator.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Neon Logo Pack");
        assert_eq!(res.body["category"], "Logo");
        assert_eq!(res.body["status"], "published");
        assert_eq!(res.body["formats"]["png"], true);
        assert_eq!(res.body["creatorId"], creator.id);
        assert_eq!(res.body["mainFile"]["originalName"], "Neon Pack.zip");
        assert_eq!(res.body["coverImages"].as_array().unwrap().len(), 2);
        assert_eq!(app.stored_files().len(), 3);
    }

    #[tokio::test]
    async fn non_creator_is_forbidden_and_nothing_is_stored() {
        let app = TestApp::spawn().await;
        let user = app.signup("Plain", "plain@example.com").await;

        let form = asset_form("Sneaky", "Logo")
            .part("mainFile", zip_part("x.zip", b"PK".to_vec()))
            .part("coverImages", png_part("a.png"));
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &user.token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn missing_cover_rolls_back_the_main_file() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;

        let form = asset_form("No Cover", "Logo")
            .part("mainFile", zip_part("x.zip", b"PK".to_vec()));
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &creator.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["errors"][0]["field"], "coverImages");
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn fifth_cover_is_rejected_without_orphans() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;

        let mut form = asset_form("Too Many", "Logo")
            .part("mainFile", zip_part("x.zip", b"PK".to_vec()));
        for i in 0..5 {
            form = form.part("coverImages", png_part(&format!("{i}.png")));
        }
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &creator.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "TOO_MANY_FILES");
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn oversized_main_file_is_rejected_without_orphans() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;

        let big = vec![7u8; MAX_MAIN_FILE as usize + 1];
        let form = asset_form("Huge", "Logo")
            .part("coverImages", png_part("a.png"))
            .part("mainFile", zip_part("huge.zip", big));
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &creator.token)
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn executable_main_file_is_rejected() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;

        let part = reqwest::multipart::Part::bytes(b"MZ".to_vec())
            .file_name("setup.exe")
            .mime_str("application/x-msdownload")
            .unwrap();
        let form = asset_form("Bad", "Logo")
            .part("mainFile", part)
            .part("coverImages", png_part("a.png"));
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &creator.token)
            .await;

        assert_eq!(res.status, 400);
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn no_format_selected_is_a_field_error() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;

        let form = reqwest::multipart::Form::new()
            .text("title", "No Formats")
            .text("description", "d")
            .text("tags", "t")
            .text("category", "Logo")
            .text("width", "1px")
            .text("height", "1px")
            .text("formats.png", "false")
            .part("mainFile", zip_part("x.zip", b"PK".to_vec()))
            .part("coverImages", png_part("a.png"));
        let res = app
            .send_multipart(Method::POST, routes::UPLOAD, form, &creator.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["errors"][0]["field"], "formats");
        assert!(app.stored_files().is_empty());
    }
}

mod browsing {
    use super::*;

    #[tokio::test]
    async fn public_listing_hides_drafts_and_includes_creator() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let shown = app.upload_asset(&creator.token, "Shown", "Logo").await;
        let hidden = app.upload_asset(&creator.token, "Hidden", "Logo").await;

        let res = app
            .put_with_token(&routes::asset(hidden), &json!({"status": "draft"}), &creator.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_without_token(routes::PUBLIC_ASSETS).await;
        assert_eq!(res.status, 200);
        let assets = res.body["assets"].as_array().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0]["id"], shown);
        assert_eq!(assets[0]["creator"]["username"], "neon");
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["pagination"]["perPage"], 12);

        let res = app.get_without_token(&routes::public_asset(hidden)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn huge_page_numbers_return_an_empty_page() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        app.upload_asset(&creator.token, "Shown", "Logo").await;

        let res = app
            .get_without_token(&format!(
                "{}?page={}&limit=100",
                routes::PUBLIC_ASSETS,
                u64::MAX
            ))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["assets"].as_array().unwrap().is_empty());
        assert_eq!(res.body["pagination"]["page"], 1_000_000);
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn owner_listing_is_paginated_newest_first() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let first = app.upload_asset(&creator.token, "First", "Logo").await;
        let second = app.upload_asset(&creator.token, "Second", "Logo").await;
        let third = app.upload_asset(&creator.token, "Third", "Logo").await;

        let res = app
            .get_with_token(&format!("{}?page=1&limit=2", routes::ASSETS), &creator.token)
            .await;
        assert_eq!(res.status, 200);
        let ids: Vec<i64> = res.body["assets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![third as i64, second as i64]);
        assert_eq!(res.body["pagination"]["totalPages"], 2);

        let res = app
            .get_with_token(&format!("{}?page=2&limit=2", routes::ASSETS), &creator.token)
            .await;
        assert_eq!(res.body["assets"][0]["id"], first);
    }

    #[tokio::test]
    async fn public_detail_counts_views() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Viewed", "Logo").await;

        let first = app.get_without_token(&routes::public_asset(id)).await;
        let second = app.get_without_token(&routes::public_asset(id)).await;
        assert_eq!(first.body["views"], 1);
        assert_eq!(second.body["views"], 2);

        let owner_view = app.get_with_token(&routes::asset(id), &creator.token).await;
        assert_eq!(owner_view.status, 200);
        assert_eq!(owner_view.body["views"], 2);
    }

    #[tokio::test]
    async fn other_users_cannot_read_private_detail() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let other = app.signup("Other", "other@example.com").await;
        let id = app.upload_asset(&creator.token, "Mine", "Logo").await;

        let res = app.get_with_token(&routes::asset(id), &other.token).await;
        assert_eq!(res.status, 403);

        let res = app.get_with_token(&routes::asset(999_999), &creator.token).await;
        assert_eq!(res.status, 404);
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn download_streams_original_and_counts() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let buyer = app.signup("Buyer", "buyer@example.com").await;
        let id = app.upload_asset(&creator.token, "Bundle", "Template").await;

        let res = app.get_raw(&routes::download(id), Some(&buyer.token)).await;
        assert_eq!(res.status(), 200);
        let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("bundle.zip"));
        let bytes = res.bytes().await.unwrap();
        assert_eq!(&bytes[..], b"PK\x03\x04 asset bytes");

        let detail = app.get_with_token(&routes::asset(id), &creator.token).await;
        assert_eq!(detail.body["downloads"], 1);
    }

    #[tokio::test]
    async fn draft_download_is_owner_only() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let other = app.signup("Other", "other@example.com").await;
        let id = app.upload_asset(&creator.token, "Draft", "Logo").await;
        app.put_with_token(&routes::asset(id), &json!({"status": "draft"}), &creator.token)
            .await;

        let res = app.get_raw(&routes::download(id), Some(&other.token)).await;
        assert_eq!(res.status(), 403);

        let res = app.get_raw(&routes::download(id), Some(&creator.token)).await;
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn cover_images_are_served_with_cache_headers() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Covered", "Logo").await;
        let detail = app.get_with_token(&routes::asset(id), &creator.token).await;
        let cover = detail.body["coverImages"][0]["filename"].as_str().unwrap().to_string();

        let res = app.get_raw(&routes::image(&cover), None).await;
        assert_eq!(res.status(), 200);
        let headers = res.headers();
        assert_eq!(headers["content-type"], "image/png");
        assert_eq!(headers["cache-control"], "public, max-age=31536000, immutable");
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.contains_key("expires"));
    }

    #[tokio::test]
    async fn image_route_refuses_main_files_and_bad_names() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Secret", "Logo").await;
        let detail = app.get_with_token(&routes::asset(id), &creator.token).await;
        let main = detail.body["mainFile"]["filename"].as_str().unwrap().to_string();

        let res = app.get_raw(&routes::image(&main), None).await;
        assert_eq!(res.status(), 404);

        let res = app.get_raw(&routes::image("..%2F..%2Fetc%2Fpasswd"), None).await;
        assert_eq!(res.status(), 404);

        let res = app.get_raw(&routes::image("coverImages-1-1.png"), None).await;
        assert_eq!(res.status(), 404);
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn owner_can_update_metadata() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Old", "Logo").await;

        let res = app
            .put_with_token(
                &routes::asset(id),
                &json!({"title": "New Title", "category": "Mockup"}),
                &creator.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "New Title");
        assert_eq!(res.body["category"], "Mockup");
    }

    #[tokio::test]
    async fn non_owner_cannot_update_or_delete() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let rival = app.create_creator("rival").await;
        let id = app.upload_asset(&creator.token, "Mine", "Logo").await;

        let res = app
            .put_with_token(&routes::asset(id), &json!({"title": "Stolen"}), &rival.token)
            .await;
        assert_eq!(res.status, 403);

        let res = app.delete_with_token(&routes::asset(id), &rival.token).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn delete_removes_row_and_files() {
        let app = TestApp::spawn().await;
        let creator = app.create_creator("neon").await;
        let id = app.upload_asset(&creator.token, "Doomed", "Logo").await;
        assert_eq!(app.stored_files().len(), 2);

        let res = app.delete_with_token(&routes::asset(id), &creator.token).await;
        assert_eq!(res.status, 204);
        assert!(app.stored_files().is_empty());

        let res = app.get_with_token(&routes::asset(id), &creator.token).await;
        assert_eq!(res.status, 404);
    }
}
