mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use lecture_portal::{create_router, models::language::LanguageCode, services::repository::LectureRepository};

use common::{
    multipart_body, multipart_content_type, publish_sample, setup_test_app, setup_with_config, stage_file,
    test_config, Part,
};

async fn body_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app();
    let router = create_router(app.state.clone());

    let response = router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["translation_api"], false);
}

#[tokio::test]
async fn test_watch_api_falls_back_to_korean() {
    let app = setup_test_app();
    let group_id = publish_sample(&app).await;
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(get(&format!("/api/watch/{}?lang=vi", group_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["actual_language"], "ko");
    assert_eq!(body["fell_back"], true);
    assert_eq!(body["requested_language"], "vi");
}

#[tokio::test]
async fn test_watch_api_serves_available_language() {
    let app = setup_test_app();
    let group_id = publish_sample(&app).await;
    let video = stage_file(&app.dir, "en.mp4", b"english");
    app.state
        .lectures
        .add_language_video(&group_id, LanguageCode::En, &video)
        .await
        .unwrap();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(get(&format!("/api/watch/{}?lang=EN", group_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["actual_language"], "en");
    assert_eq!(body["fell_back"], false);
    assert!(body["video_url"].as_str().unwrap().ends_with("_video_en.mp4"));
}

#[tokio::test]
async fn test_watch_api_unknown_lecture() {
    let app = setup_test_app();
    let router = create_router(app.state.clone());

    let response = router.oneshot(get("/api/watch/missing?lang=en")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_watch_page_shows_fallback_notice() {
    let app = setup_test_app();
    let group_id = publish_sample(&app).await;
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(get(&format!("/watch/{}?lang=ja", group_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("크레인 안전 교육"));
    assert!(html.contains("日本語"));
    assert!(html.contains("한국어 원본 영상을 재생합니다"));
    assert!(html.contains("_video_ko.mp4"));
}

#[tokio::test]
async fn test_unknown_route_renders_error_page() {
    let app = setup_test_app();
    let router = create_router(app.state.clone());

    let response = router.oneshot(get("/no/such/page")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("404"));
    assert!(html.contains("페이지를 찾을 수 없습니다."));
}

#[tokio::test]
async fn test_categories_endpoint() {
    let app = setup_test_app();
    let router = create_router(app.state.clone());

    let response = router.oneshot(get("/api/categories")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["main_categories"][0]["name"], "기계");
}

#[tokio::test]
async fn test_translate_without_api_key_uses_keywords() {
    let app = setup_test_app();
    let router = create_router(app.state.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/translate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "text": "용접 기초", "target_languages": ["en", "ja", "xx"] }).to_string(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "en": "Welding_Basic", "ja": "溶接_基礎" }));
}

#[tokio::test]
async fn test_translate_rejects_empty_text() {
    let app = setup_test_app();
    let router = create_router(app.state.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/translate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "text": "  " }).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_require_token_when_configured() {
    let mut config = test_config();
    config.admin.api_token = Some("secret-token".to_string());
    let app = setup_with_config(config);

    let response = create_router(app.state.clone())
        .oneshot(get("/api/admin/videos"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/admin/videos")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/admin/videos")
        .header(header::COOKIE, "admin_token=secret-token")
        .body(Body::empty())
        .unwrap();
    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Public routes are unaffected
    let response = create_router(app.state.clone()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_list_and_detail() {
    let app = setup_test_app();
    let group_id = publish_sample(&app).await;

    let response = create_router(app.state.clone())
        .oneshot(get("/api/admin/videos?limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["videos"][0]["group_id"], group_id.as_str());
    assert_eq!(body["videos"][0]["languages"]["ko"], true);

    let response = create_router(app.state.clone())
        .oneshot(get(&format!("/api/admin/videos/{}", group_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["supported_languages"], json!(["ko"]));
    assert_eq!(body["language_breakdown"]["ko"]["is_original"], true);
}

#[tokio::test]
async fn test_upload_page_flow() {
    let app = setup_test_app();

    let body = multipart_body(&[
        Part::Text("group_name", "용접 기초"),
        Part::Text("main_category", "공구"),
        Part::Text("sub_category", "절삭공구"),
        Part::Text("sub_sub_category", "가스 용접기"),
        Part::Text("content_description", "가스 용접기의 기초 사용법과 안전 수칙을 다룹니다."),
        Part::Text("translated_filenames", r#"{"en": "Welding Basics"}"#),
        Part::File {
            name: "file",
            filename: "welding.mp4",
            content_type: "video/mp4",
            content: b"korean welding video",
        },
        Part::File {
            name: "thumbnail",
            filename: "",
            content_type: "application/octet-stream",
            content: b"",
        },
    ]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("업로드 완료"));

    let groups = app.repo.list_recent(10).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert!(html.contains(&groups[0].group_id));
    assert_eq!(groups[0].translated_titles["en"], "Welding_Basics");
    assert!(groups[0].thumbnail_url.is_none());
}

#[tokio::test]
async fn test_upload_page_reports_validation_error() {
    let app = setup_test_app();

    let body = multipart_body(&[
        Part::Text("group_name", "용접 기초"),
        Part::Text("main_category", "공구"),
        Part::Text("sub_category", "절삭공구"),
        Part::Text("sub_sub_category", "가스 용접기"),
        Part::Text("content_description", "가스 용접기의 기초 사용법을 다룹니다."),
    ]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("동영상 파일을 선택해주세요."));
    assert!(!html.contains("Validation failed"));
}

#[tokio::test]
async fn test_upload_page_shows_korean_field_message() {
    let app = setup_test_app();

    let body = multipart_body(&[
        Part::Text("group_name", "용접 기초"),
        Part::Text("main_category", "공구"),
        Part::Text("sub_category", "절삭공구"),
        Part::Text("sub_sub_category", "가스 용접기"),
        Part::Text("content_description", "짧음"),
        Part::File {
            name: "file",
            filename: "welding.mp4",
            content_type: "video/mp4",
            content: b"korean welding video",
        },
    ]);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("글자 이상 입력해주세요."));
    assert!(!html.contains("Validation failed"));
    assert!(app.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_openapi_documents_language_upload_form() {
    let app = setup_test_app();

    let response = create_router(app.state.clone())
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let request_body = &body["paths"]["/api/admin/upload_language_video"]["post"]["requestBody"];
    assert!(request_body["content"]["multipart/form-data"].is_object());
    assert_eq!(request_body["description"], "group_id, language_code, file");
}

#[tokio::test]
async fn test_upload_language_video_endpoint() {
    let app = setup_test_app();
    let group_id = publish_sample(&app).await;

    let body = multipart_body(&[
        Part::Text("group_id", &group_id),
        Part::Text("language_code", "th"),
        Part::File {
            name: "file",
            filename: "thai.mov",
            content_type: "video/quicktime",
            content: b"thai video",
        },
    ]);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/upload_language_video")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["language_code"], "th");

    let response = create_router(app.state.clone())
        .oneshot(get(&format!("/api/watch/{}?lang=th", group_id)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["actual_language"], "th");
    assert_eq!(body["content_type"], "video/quicktime");
}

#[tokio::test]
async fn test_upload_language_video_rejects_unknown_language() {
    let app = setup_test_app();
    let group_id = publish_sample(&app).await;

    let body = multipart_body(&[
        Part::Text("group_id", &group_id),
        Part::Text("language_code", "fr"),
        Part::File {
            name: "file",
            filename: "french.mp4",
            content_type: "video/mp4",
            content: b"french video",
        },
    ]);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/upload_language_video")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap();

    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "VALIDATION_FAILED");
}
