#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use plant_analysis_service::config::PlantConfig;
use plant_analysis_service::startup::Application;
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Stand-in for the Gemini REST API that answers every `generateContent`
/// call with a canned status and body, and records what it was sent.
pub struct FakeGemini {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: Value,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn generate_content(
    State(state): State<FakeState>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.received.lock().unwrap().push(request);
    (state.status, Json(state.body))
}

impl FakeGemini {
    pub async fn spawn(status: StatusCode, body: Value) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            body,
            received: received.clone(),
        };

        let app = Router::new()
            .route("/models/:call", post(generate_content))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Gemini");
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            received,
        }
    }

    /// Fake that answers with a single candidate carrying `text`.
    pub async fn answering(text: &str) -> Self {
        Self::spawn(StatusCode::OK, text_response(text)).await
    }

    pub fn requests(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 300, "candidatesTokenCount": 120, "totalTokenCount": 420 }
    })
}

pub struct TestApp {
    pub address: String,
    pub reports_dir: PathBuf,
    pub gemini: FakeGemini,
}

impl TestApp {
    pub async fn spawn(gemini: FakeGemini) -> Self {
        let reports_dir = PathBuf::from(format!("target/test-reports-{}", Uuid::new_v4()));

        let mut config = PlantConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.gemini.api_base = gemini.base_url.clone();
        config.reports.dir = reports_dir.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(app.run_until_stopped());

        // Wait for the server to answer
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            reports_dir,
            gemini,
        }
    }

    /// Names of everything currently in the reports directory.
    pub fn report_files(&self) -> Vec<String> {
        std::fs::read_dir(&self.reports_dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.reports_dir).await;
    }
}

pub fn encode_image(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), format)
        .expect("Failed to encode test image");
    out
}

/// A 10×10 solid red PNG.
pub fn red_png() -> Vec<u8> {
    encode_image(10, 10, [255, 0, 0], ImageFormat::Png)
}
