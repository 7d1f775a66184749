//! Integration tests for the memorial site
//!
//! These drive the full axum router in-process: locale resolution for page
//! loads, the catch-all redirect and the guestbook, gallery and admin API.
//! Each test gets its own temporary SQLite database and directories.

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE, VARY},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use memorial_site::{
    config::Config,
    db::Database,
    i18n::{LocaleCode, MessageCatalog},
    security::AdminCredentials,
    server::{router, AppState},
};

// ==================== Test Helpers ====================

const BOUNDARY: &str = "memorial-test-boundary";

fn create_test_config(temp_dir: &TempDir) -> Config {
    let root = temp_dir.path();
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: root.join("data"),
        photos_dir: root.join("photos"),
        static_dir: root.join("dist"),
        max_upload_bytes: 1024 * 1024,
        database_url: format!("sqlite:{}?mode=rwc", root.join("guestbook.db").display()),
        admin: AdminCredentials::new("admin", "secret"),
        default_locale: LocaleCode::ENGLISH,
    }
}

async fn create_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&temp_dir);
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to create database");
    let catalog = MessageCatalog::embedded().expect("Embedded catalogs should load");

    (router(AppState::new(config, db, catalog)), temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("Router is infallible")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn page_request(accept_language: Option<&str>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/");
    if let Some(value) = accept_language {
        builder = builder.header(ACCEPT_LANGUAGE, value);
    }
    if let Some(value) = cookie {
        builder = builder.header(COOKIE, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("Body should be JSON")
}

fn multipart_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/admin/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ==================== Startup Locale Tests ====================

#[tokio::test]
async fn test_page_uses_browser_language() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, page_request(Some("ko-KR,ko;q=0.9,en;q=0.8"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[VARY]
        .to_str()
        .unwrap()
        .contains("Accept-Language"));

    let html = body_text(response).await;
    assert!(html.contains(r#"<html lang="ko">"#));
    assert!(html.contains("<title>김의 추모관</title>"));
    assert!(html.contains(r#""locale":"ko""#));
    assert!(html.contains(r#""fallbackLocale":"en""#));
}

#[tokio::test]
async fn test_page_saved_preference_beats_browser() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        page_request(Some("ko-KR"), Some("theme=dark; app-locale=zh-Hant")),
    )
    .await;

    let html = body_text(response).await;
    assert!(html.contains(r#"<html lang="zh-Hant">"#));
    assert!(html.contains("<title>金的紀念館</title>"));
}

#[tokio::test]
async fn test_page_unsupported_preference_falls_through() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, page_request(Some("zh-TW"), Some("app-locale=fr"))).await;
    let html = body_text(response).await;
    assert!(html.contains(r#"<html lang="zh-Hant">"#));

    // Case matters for saved values
    let response = send(&app, page_request(None, Some("app-locale=KO"))).await;
    let html = body_text(response).await;
    assert!(html.contains(r#"<html lang="en">"#));
}

#[tokio::test]
async fn test_page_simplified_chinese_and_default() {
    let (app, _temp_dir) = create_test_app().await;

    let html = body_text(send(&app, page_request(Some("zh-CN,zh;q=0.9"), None)).await).await;
    assert!(html.contains(r#"<html lang="zh-Hans">"#));

    let html = body_text(send(&app, page_request(Some("fr-FR,de;q=0.5"), None)).await).await;
    assert!(html.contains(r#"<html lang="en">"#));

    let html = body_text(send(&app, page_request(None, None)).await).await;
    assert!(html.contains(r#"<html lang="en">"#));
    assert!(html.contains("<title>Kim&#39;s Memorial</title>"));
}

#[tokio::test]
async fn test_page_respects_quality_order() {
    let (app, _temp_dir) = create_test_app().await;

    let html = body_text(
        send(&app, page_request(Some("en;q=0.5,ko;q=0.9"), None)).await,
    )
    .await;
    assert!(html.contains(r#"<html lang="ko">"#));
}

#[tokio::test]
async fn test_admin_page_renders_admin_view() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        Request::builder()
            .uri("/admin")
            .header(ACCEPT_LANGUAGE, "ko")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"data-view="AdminView""#));
    assert!(html.contains("<title>김의 추모관 · 관리자</title>"));
}

// ==================== Static Files And Routing Tests ====================

#[tokio::test]
async fn test_unknown_path_redirects_home() {
    let (app, _temp_dir) = create_test_app().await;

    for path in ["/gallery/12", "/no/such/page?x=1", "/admin/extra"] {
        let response = send(&app, get(path)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(response.headers()[LOCATION], "/");
    }
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, get("/api/nothing/here")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Not Found");
}

#[tokio::test]
async fn test_built_frontend_is_served_and_injected() {
    let (app, temp_dir) = create_test_app().await;
    let dist = temp_dir.path().join("dist");
    std::fs::create_dir_all(dist.join("assets")).unwrap();
    std::fs::write(
        dist.join("index.html"),
        r#"<!DOCTYPE html><html lang="en"><head><title>Built</title></head><body><div id="app"></div></body></html>"#,
    )
    .unwrap();
    std::fs::write(dist.join("assets/app.js"), "console.log('app')").unwrap();

    let response = send(&app, get("/assets/app.js")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "console.log('app')");

    let html = body_text(send(&app, page_request(Some("ko"), None)).await).await;
    assert!(html.contains(r#"<html lang="ko">"#));
    assert!(html.contains("<title>Built</title>"));
    assert!(html.find("i18n-setup").unwrap() < html.find("</head>").unwrap());
}

#[tokio::test]
async fn test_health() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["i18n"]["default_rate"].is_number());
}

// ==================== Locale API Tests ====================

#[tokio::test]
async fn test_locale_messages() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, get("/api/i18n/zh-Hans")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["app"]["title"], "金的纪念馆");

    let response = send(&app, get("/api/i18n/fr")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_locales() {
    let (app, _temp_dir) = create_test_app().await;

    let json = body_json(send(&app, get("/api/locales")).await).await;
    let codes: Vec<&str> = json["locales"]
        .as_array()
        .unwrap()
        .iter()
        .map(|locale| locale["code"].as_str().unwrap())
        .collect();

    assert_eq!(codes, vec!["en", "ko", "zh-Hans", "zh-Hant"]);
    assert_eq!(json["fallback"], "en");
    assert_eq!(json["default"], "en");
}

#[tokio::test]
async fn test_set_locale_issues_cookie() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, post_json("/api/locale", json!({ "locale": "ko" }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("app-locale=ko;"));
    assert!(cookie.contains("Path=/"));

    // The issued cookie drives the next page load
    let pair = cookie.split(';').next().unwrap();
    let html = body_text(send(&app, page_request(Some("en-US"), Some(pair))).await).await;
    assert!(html.contains(r#"<html lang="ko">"#));
}

#[tokio::test]
async fn test_set_locale_rejects_unsupported() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(&app, post_json("/api/locale", json!({ "locale": "zh-hant" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(
        body_json(response).await["error"],
        "Unsupported locale: 'zh-hant'"
    );
}

// ==================== Guestbook Tests ====================

#[tokio::test]
async fn test_guestbook_flow() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        post_json("/api/guestbook", json!({ "name": "Ana", "content": "Rest well" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    send(
        &app,
        post_json("/api/guestbook", json!({ "name": "민수", "content": "보고 싶어요" })),
    )
    .await;

    let entries = body_json(send(&app, get("/api/guestbook")).await).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "민수");
    assert_eq!(entries[1]["content"], "Rest well");
}

#[tokio::test]
async fn test_guestbook_rejects_incomplete_entries() {
    let (app, _temp_dir) = create_test_app().await;

    for body in [
        json!({ "name": "Ana" }),
        json!({ "content": "no name" }),
        json!({ "name": "", "content": "empty name" }),
    ] {
        let response = send(&app, post_json("/api/guestbook", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Missing name or content");
    }

    let entries = body_json(send(&app, get("/api/guestbook")).await).await;
    assert!(entries.as_array().unwrap().is_empty());
}

// ==================== Admin Tests ====================

#[tokio::test]
async fn test_admin_login() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        post_json("/api/admin/login", json!({ "id": "admin", "password": "secret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        post_json("/api/admin/login", json!({ "id": "admin", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_moderation() {
    let (app, _temp_dir) = create_test_app().await;

    send(
        &app,
        post_json("/api/guestbook", json!({ "name": "Spam", "content": "buy now" })),
    )
    .await;

    let response = send(&app, post_json("/api/admin/guestbook", json!({ "id": "admin" }))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Unauthorized");

    let all = body_json(
        send(
            &app,
            post_json("/api/admin/guestbook", json!({ "id": "admin", "password": "secret" })),
        )
        .await,
    )
    .await;
    let id = all[0]["id"].as_i64().unwrap();
    assert_eq!(all[0]["visible"], 1);

    let toggle_uri = format!("/api/admin/guestbook/{id}/toggle");

    let response = send(
        &app,
        post_json(&toggle_uri, json!({ "id": "admin", "password": "secret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing visible state");

    let response = send(
        &app,
        post_json(
            &toggle_uri,
            json!({ "id": "admin", "password": "secret", "visible": false }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let visible = body_json(send(&app, get("/api/guestbook")).await).await;
    assert!(visible.as_array().unwrap().is_empty());

    send(
        &app,
        post_json(
            &toggle_uri,
            json!({ "id": "admin", "password": "secret", "visible": 1 }),
        ),
    )
    .await;
    let visible = body_json(send(&app, get("/api/guestbook")).await).await;
    assert_eq!(visible.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_toggle_rejects_malformed_requests() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        post_json(
            "/api/admin/guestbook/1/toggle",
            json!({ "id": "admin", "password": "secret", "visible": "1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["error"].is_string());

    let response = send(
        &app,
        post_json(
            "/api/admin/guestbook/abc/toggle",
            json!({ "id": "admin", "password": "secret", "visible": 1 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("abc"));
}

// ==================== Malformed Request Tests ====================

#[tokio::test]
async fn test_malformed_json_body_is_json_error() {
    let (app, _temp_dir) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/guestbook")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!body_json(response).await["error"]
        .as_str()
        .unwrap()
        .is_empty());

    let request = Request::builder()
        .method("POST")
        .uri("/api/locale")
        .body(Body::from(r#"{"locale":"ko"}"#))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(response).await["error"].is_string());
}

// ==================== Gallery Tests ====================

#[tokio::test]
async fn test_gallery_listing_and_files() {
    let (app, temp_dir) = create_test_app().await;
    let photos = temp_dir.path().join("photos");
    std::fs::create_dir_all(&photos).unwrap();
    for name in ["10.jpg", "2.jpg", "1.png"] {
        std::fs::write(photos.join(name), name.as_bytes()).unwrap();
    }

    let json = body_json(send(&app, get("/api/gallery")).await).await;
    assert_eq!(json, json!(["1.png", "2.jpg", "10.jpg"]));

    let response = send(&app, get("/photos/10.jpg")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "10.jpg");
}

#[tokio::test]
async fn test_gallery_empty_without_directory() {
    let (app, _temp_dir) = create_test_app().await;

    let json = body_json(send(&app, get("/api/gallery")).await).await;
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_admin_upload() {
    let (app, temp_dir) = create_test_app().await;

    let response = send(
        &app,
        multipart_request(
            &[("id", "admin"), ("password", "secret")],
            Some(("Candle.JPG", b"jpeg-bytes")),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["filename"], "1.jpg");
    assert_eq!(
        std::fs::read(temp_dir.path().join("photos/1.jpg")).unwrap(),
        b"jpeg-bytes"
    );

    let listed = body_json(send(&app, get("/api/gallery")).await).await;
    assert_eq!(listed, json!(["1.jpg"]));
}

#[tokio::test]
async fn test_admin_upload_errors() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        multipart_request(&[("id", "admin"), ("password", "nope")], Some(("a.jpg", b"x"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        multipart_request(&[("id", "admin"), ("password", "secret")], None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file part");

    let response = send(
        &app,
        multipart_request(&[("id", "admin"), ("password", "secret")], Some(("", b"x"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No selected file");
}

#[tokio::test]
async fn test_admin_upload_too_large() {
    let (app, temp_dir) = create_test_app().await;
    let oversized = vec![0u8; 2 * 1024 * 1024];

    let response = send(
        &app,
        multipart_request(
            &[("id", "admin"), ("password", "secret")],
            Some(("huge.jpg", oversized.as_slice())),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(response).await["error"].is_string());

    let photos = temp_dir.path().join("photos");
    assert!(!photos.join("1.jpg").exists());
    let listed = body_json(send(&app, get("/api/gallery")).await).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_admin_upload_requires_multipart() {
    let (app, _temp_dir) = create_test_app().await;

    let response = send(
        &app,
        post_json(
            "/api/admin/upload",
            json!({ "id": "admin", "password": "secret" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
