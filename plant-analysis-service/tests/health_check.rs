mod common;

use common::{FakeGemini, TestApp};

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn(FakeGemini::answering("unused").await).await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers()["x-content-type-options"],
        "nosniff"
    );

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "plant-analysis-service");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn(FakeGemini::answering("unused").await).await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", app.address))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn unknown_route_is_404_json() {
    let app = TestApp::spawn(FakeGemini::answering("unused").await).await;

    let response = reqwest::Client::new()
        .get(format!("{}/index.html", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Cannot GET /index.html");
}
