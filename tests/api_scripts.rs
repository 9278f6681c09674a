mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};

use helpers::{TestApp, body_bytes, body_json, test_app};

const FORMATTED: &str = r#"<div class="space-y-6">
    <h3><span class="bullet"></span><span>INTRODUCTION</span></h3>
    <p>Welcome to the <strong>deep sea</strong>. Today we dive.</p>
    <h3><span class="bullet"></span><span>MAIN CONTENT</span></h3>
    <p>Anglerfish use <i>bioluminescence</i>.<br>They live in the dark.</p>
</div>"#;

async fn app() -> TestApp {
    // generation is never reached from these routes
    test_app("http://127.0.0.1:9/unused").await
}

fn save_payload() -> Value {
    json!({
        "script": "INTRODUCTION\nWelcome to the deep sea. Today we dive.\nMAIN CONTENT\nAnglerfish use bioluminescence.",
        "title": "Deep sea",
        "metadata": {
            "formatted_html": FORMATTED,
            "unformatted_sections": [
                { "title": "INTRODUCTION", "content": ["Welcome to the deep sea. Today we dive."] },
                { "title": "MAIN CONTENT", "content": ["Anglerfish use bioluminescence."] }
            ],
            "timestamp": "2024-03-09T14:05:30.000Z",
            "version": "1.0"
        }
    })
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn save(app: &TestApp) -> String {
    let response = app
        .send(json_request("POST", "/save_script", &save_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    body["filename"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_save_list_get_download_delete() {
    let app = app().await;

    let filename = save(&app).await;
    assert!(filename.ends_with("_script.pdf"), "unexpected name {filename}");
    assert!(app.scripts_dir().join(&filename).is_file());
    assert!(app.scripts_dir().join("scripts_metadata.json").is_file());

    let listing = body_json(app.send(get("/api/saved_scripts")).await).await;
    assert_eq!(listing["success"], true);
    let scripts = listing["scripts"].as_array().unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0]["filename"], filename.as_str());
    assert!(
        scripts[0]["title"]
            .as_str()
            .unwrap()
            .starts_with("Welcome to the deep sea")
    );
    assert!(scripts[0]["preview"].as_str().unwrap().starts_with("INTRODUCTION"));

    let content = body_json(app.send(get(&format!("/get_script_content/{filename}"))).await).await;
    assert_eq!(content["success"], true);
    assert_eq!(content["content"], FORMATTED);

    let response = app.send(get(&format!("/download_script/{filename}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&filename));
    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF"));

    let deleted = app.send(delete(&format!("/delete_script/{filename}"))).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await["success"], true);
    assert!(!app.scripts_dir().join(&filename).exists());

    let missing = app.send(get(&format!("/download_script/{filename}"))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = body_json(missing).await;
    assert_eq!(body["success"], false);

    let listing = body_json(app.send(get("/api/saved_scripts")).await).await;
    assert!(listing["scripts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_saving_twice_in_the_same_second_keeps_both() {
    let app = app().await;

    let first = save(&app).await;
    let second = save(&app).await;
    assert_ne!(first, second);

    let listing = body_json(app.send(get("/api/saved_scripts")).await).await;
    assert_eq!(listing["scripts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_save_requires_formatted_content() {
    let app = app().await;

    let mut payload = save_payload();
    payload["metadata"]["formatted_html"] = json!("   ");
    let response = app.send(json_request("POST", "/save_script", &payload)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No formatted content provided");

    let response = app
        .send(json_request("POST", "/save_script", &json!({ "script": "x" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_rejects_malformed_json() {
    let app = app().await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/save_script")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_traversal_filenames_are_rejected() {
    let app = app().await;
    save(&app).await;

    for uri in [
        "/download_script/..%2Fscripts_metadata.json",
        "/get_script_content/..",
        "/delete_script/..%2F..%2Fetc",
    ] {
        let request = if uri.starts_with("/delete") {
            delete(uri)
        } else {
            get(uri)
        };
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_scripts_are_not_found() {
    let app = app().await;

    let response = app.send(get("/get_script_content/nope.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // nothing was ever saved, so there is no index to delete from
    let response = app.send(delete("/delete_script/nope.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Script index not found");
}

#[tokio::test]
async fn test_saved_scripts_page_lists_titles() {
    let app = app().await;
    let filename = save(&app).await;

    let response = app.send(get("/saved_scripts")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(&filename));
}

#[tokio::test]
async fn test_health_and_index_page() {
    let app = app().await;

    let response = app.send(get("/healthz")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["ocr"], "unavailable");

    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("generator"));

    let response = app.send(get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/generate_script"].is_object());
    assert!(spec["paths"]["/save_script"].is_object());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = app().await;

    let response = app.send(get("/healthz")).await;
    assert!(response.headers().contains_key("x-request-id"));
}
