//! Integration tests for the bobbin-server REST API.
//!
//! Each test spawns the server binary against a fresh temp data root, waits
//! for `/health`, and drives the HTTP surface with reqwest.

use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;

struct ServerHandle {
    child: tokio::process::Child,
    port: u16,
    stdout_drain: Option<tokio::task::JoinHandle<()>>,
}

impl ServerHandle {
    async fn stop(mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.kill().await;
        let _ = self.child.wait().await;
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.start_kill();
    }
}

fn server_binary() -> Result<PathBuf, String> {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_bobbin-server") {
        return Ok(PathBuf::from(path));
    }
    let current_exe = std::env::current_exe()
        .map_err(|e| format!("failed to resolve current_exe for fallback: {e}"))?;
    let target_debug_dir = current_exe
        .parent()
        .and_then(|p| p.parent())
        .ok_or_else(|| "failed to resolve target/debug directory for fallback".to_string())?;

    let mut fallback = target_debug_dir.join("bobbin-server");
    if cfg!(target_os = "windows") {
        fallback.set_extension("exe");
    }
    if !fallback.exists() {
        return Err(format!(
            "CARGO_BIN_EXE_bobbin-server not set and fallback binary not found at {}",
            fallback.display()
        ));
    }
    Ok(fallback)
}

/// Start the server binary and wait until `/health` is ready.
async fn start_server(data_root: &std::path::Path) -> Result<ServerHandle, String> {
    let binary = server_binary()?;

    let mut child = tokio::process::Command::new(&binary)
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("0")
        .arg("--data-root")
        .arg(data_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to spawn bobbin-server: {e}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "failed to capture stdout".to_string())?;
    let mut lines = tokio::io::BufReader::new(stdout).lines();

    // Read the HTTP_PORT= line the binary prints once bound.
    let port = tokio::time::timeout(Duration::from_secs(20), async {
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(port_str) = line.strip_prefix("HTTP_PORT=") {
                if let Ok(port) = port_str.trim().parse::<u16>() {
                    return Some(port);
                }
            }
        }
        None
    })
    .await
    .map_err(|_| "timed out waiting for HTTP_PORT line".to_string())?
    .ok_or_else(|| "server exited before printing HTTP_PORT".to_string())?;

    // Keep draining stdout so the child never blocks on a full pipe.
    let stdout_drain = tokio::spawn(async move {
        while let Ok(Some(_)) = lines.next_line().await {}
    });

    if !wait_for_server(port, 20).await {
        let _ = child.kill().await;
        return Err("server did not become healthy".to_string());
    }

    Ok(ServerHandle {
        child,
        port,
        stdout_drain: Some(stdout_drain),
    })
}

async fn check_health(port: u16) -> bool {
    let client = reqwest::Client::new();
    if let Ok(response) = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        if let Ok(json) = response.json::<Value>().await {
            return json.get("status").and_then(|v| v.as_str()) == Some("ok");
        }
    }
    false
}

async fn wait_for_server(port: u16, timeout_secs: u64) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_secs(timeout_secs) {
        if check_health(port).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

fn url(port: u16, path: &str) -> String {
    format!("http://127.0.0.1:{}{}", port, path)
}

async fn post_json(port: u16, path: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url(port, path))
        .json(&body)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn put_json(port: u16, path: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .put(url(port, path))
        .json(&body)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_json(port: u16, path: &str) -> (u16, Value) {
    let response = reqwest::Client::new()
        .get(url(port, path))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn delete_json(port: u16, path: &str) -> (u16, Value) {
    let response = reqwest::Client::new()
        .delete(url(port, path))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

/// Create a series, returning its id.
async fn create_series(port: u16, name: &str, model_type: &str) -> String {
    let (status, body) = post_json(
        port,
        "/api/series",
        json!({"name": name, "modelType": model_type}),
    )
    .await;
    assert_eq!(status, 201, "series create failed: {body}");
    body["series"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    assert!(check_health(server.port).await);
    server.stop().await;
}

#[tokio::test]
async fn test_model_crud_roundtrip() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let series_id = create_series(port, "GC6158 Series", "Lockstitch").await;

    // Create
    let (status, body) = post_json(
        port,
        "/api/models/lockstitch",
        json!({
            "model": "GC6158MD",
            "technicalDescription": "Direct drive lockstitch",
            "series": series_id,
            "speedInRPM": 4500.0,
            "isSuitableForMediumMaterial": true
        }),
    )
    .await;
    assert_eq!(status, 201, "create failed: {body}");
    assert_eq!(body["message"], "Model created successfully");
    let model_id = body["model"]["id"].as_str().unwrap().to_string();
    // Defaults filled in
    assert_eq!(body["model"]["functions"], "*");

    // List
    let (status, body) = get_json(port, "/api/models/lockstitch").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Get by id
    let (status, body) = get_json(port, &format!("/api/models/lockstitch/{model_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["model"], "GC6158MD");
    assert_eq!(body["speedInRPM"], json!(4500.0));

    // Update
    let (status, body) = put_json(
        port,
        &format!("/api/models/lockstitch/{model_id}"),
        json!({"voltage": "220V"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["model"]["voltage"], "220V");
    assert_eq!(body["model"]["model"], "GC6158MD");

    // Delete
    let (status, body) = delete_json(port, &format!("/api/models/lockstitch/{model_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Model deleted successfully");

    let (status, _) = get_json(port, &format!("/api/models/lockstitch/{model_id}")).await;
    assert_eq!(status, 404);

    server.stop().await;
}

#[tokio::test]
async fn test_series_reference_lifecycle() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let series_id = create_series(port, "Overlock Pro", "Overlock").await;

    let (_, body) = post_json(
        port,
        "/api/models/overlock",
        json!({"model": "GN795-4", "series": series_id}),
    )
    .await;
    let model_id = body["model"]["id"].as_str().unwrap().to_string();

    // The create ran the attach sweep: the series lists the model.
    let (status, body) = get_json(port, &format!("/api/series/{series_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["models"], json!([model_id]));

    // Deleting the model prunes the reference.
    delete_json(port, &format!("/api/models/overlock/{model_id}")).await;
    let (_, body) = get_json(port, &format!("/api/series/{series_id}")).await;
    assert_eq!(body["models"], json!([]));

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_category_is_404() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let (status, body) = get_json(port, "/api/models/embroidery").await;
    assert_eq!(status, 404);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Unknown category"));

    let (status, _) = post_json(
        port,
        "/api/models/embroidery",
        json!({"model": "X", "series": "s1"}),
    )
    .await;
    assert_eq!(status, 404);

    server.stop().await;
}

#[tokio::test]
async fn test_schema_fields_endpoint() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let (status, body) = get_json(port, "/api/models/heavyduty/schema").await;
    assert_eq!(status, 200);
    assert_eq!(body["model"], "String");
    assert_eq!(body["hasAutoLift"], "Boolean");
    assert_eq!(body["speedInRPM"], "Number");
    assert_eq!(body["series"], "ObjectID");
    assert_eq!(body["subModels"], "Array");

    server.stop().await;
}

#[tokio::test]
async fn test_multipart_create_with_image() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let series_id = create_series(port, "Cutting", "Cuttingmachine").await;

    let form = reqwest::multipart::Form::new()
        .text("model", "CZD-108")
        .text("series", series_id.clone())
        .text("oil", "true")
        .text("speedInRPM", "2800")
        .text("subModels", r#"[{"model":"CZD-108-S"}]"#)
        .part(
            "image",
            reqwest::multipart::Part::bytes(b"fake image bytes".to_vec())
                .file_name("blade.png"),
        );

    let response = reqwest::Client::new()
        .post(url(port, "/api/models/cuttingmachine"))
        .multipart(form)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status().as_u16(), 201);
    let body = response.json::<Value>().await.unwrap();

    let model = &body["model"];
    assert_eq!(model["oil"], json!(true));
    assert_eq!(model["speedInRPM"], json!(2800.0));
    assert_eq!(model["subModels"][0]["model"], "CZD-108-S");
    let image = model["image"].as_str().unwrap();
    assert!(image.starts_with("uploads/image-"));
    assert!(temp.path().join(image).exists());

    server.stop().await;
}

#[tokio::test]
async fn test_multipart_create_accepts_large_image() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let series_id = create_series(port, "Heavy Duty", "HeavyDuty").await;

    // Well over the framework's stock 2 MB body limit, under the image cap.
    let big_image = vec![0xAB_u8; 3 * 1024 * 1024];
    let form = reqwest::multipart::Form::new()
        .text("model", "GK32-500")
        .text("series", series_id)
        .part(
            "image",
            reqwest::multipart::Part::bytes(big_image).file_name("plate.png"),
        );

    let response = reqwest::Client::new()
        .post(url(port, "/api/models/heavyduty"))
        .multipart(form)
        .timeout(Duration::from_secs(30))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status().as_u16(), 201);
    let body = response.json::<Value>().await.unwrap();
    let image = body["model"]["image"].as_str().unwrap();
    assert_eq!(
        std::fs::metadata(temp.path().join(image)).unwrap().len(),
        3 * 1024 * 1024
    );

    server.stop().await;
}

#[tokio::test]
async fn test_image_update_requires_file() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let series_id = create_series(port, "Fusing", "Fusingmachine").await;
    let (_, body) = post_json(
        port,
        "/api/models/fusingmachine",
        json!({"model": "NHG-600", "series": series_id}),
    )
    .await;
    let model_id = body["model"]["id"].as_str().unwrap().to_string();

    // Multipart body with no file part.
    let form = reqwest::multipart::Form::new().text("caption", "no file here");
    let response = reqwest::Client::new()
        .put(url(port, &format!("/api/models/fusingmachine/{model_id}/image")))
        .multipart(form)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status().as_u16(), 400);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["message"], "No image file uploaded");

    // And with one.
    let form = reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(b"new image".to_vec()).file_name("press.jpg"),
    );
    let response = reqwest::Client::new()
        .put(url(port, &format!("/api/models/fusingmachine/{model_id}/image")))
        .multipart(form)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert!(body["model"]["image"]
        .as_str()
        .unwrap()
        .starts_with("uploads/image-"));

    server.stop().await;
}

#[tokio::test]
async fn test_series_crud_and_reconcile_endpoint() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let series_id = create_series(port, "Zigzag Basic", "Zigzag").await;

    // Update
    let (status, body) = put_json(
        port,
        &format!("/api/series/{series_id}"),
        json!({"name": "Zigzag Deluxe"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["series"]["name"], "Zigzag Deluxe");

    // A series preloaded with a bogus model reference gets swept.
    let (status, body) = post_json(
        port,
        "/api/series",
        json!({"name": "Ghosts", "modelType": "Zigzag", "models": ["no-such-model"]}),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["series"]["models"], json!([]));

    // Manual reconcile reports cleanly on a consistent catalog.
    let (status, body) = post_json(port, "/api/maintenance/reconcile", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Reconciliation completed");
    assert_eq!(body["report"]["refsPruned"], json!(0));
    assert!(body["report"]["seriesScanned"].as_u64().unwrap() >= 2);

    // Delete
    let (status, _) = delete_json(port, &format!("/api/series/{series_id}")).await;
    assert_eq!(status, 200);
    let (status, _) = get_json(port, &format!("/api/series/{series_id}")).await;
    assert_eq!(status, 404);

    server.stop().await;
}

#[tokio::test]
async fn test_model_without_series_is_400() {
    let temp = TempDir::new().unwrap();
    let server = start_server(temp.path()).await.unwrap();
    let port = server.port;

    let (status, _) = post_json(port, "/api/models/interlock", json!({"model": "FW777"})).await;
    assert_eq!(status, 400);

    server.stop().await;
}
