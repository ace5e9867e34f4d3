use std::io::Write;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::{Json, Router, routing::get};
use custom_exporter::prelude::*;
use custom_exporter::server::{AppState, create_router};
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// Start a local JSON endpoint and return its base URL
async fn start_status_server() -> String {
    let app = Router::new()
        .route(
            "/status",
            get(|| async { Json(serde_json::json!({"connections": {"active": 7, "idle": [1, 2, 3]}})) }),
        )
        .route("/plain", get(|| async { "uptime: 3600 seconds" }))
        .route(
            "/overloaded",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "12") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[tokio::test]
async fn test_full_pipeline_over_real_sources() {
    let base = start_status_server().await;

    let mut data_file = NamedTempFile::new().unwrap();
    writeln!(data_file, "header\n  41.5  \nfooter").unwrap();

    let config_file = write_config(&format!(
        r#"
exporters:
  - name: shell_value
    type: command
    command: "echo value=42.5"
    interval: 60
    metric_type: gauge
    parser:
      type: regex
      pattern: 'value=(\d+\.?\d*)'
    labels:
      source: shell
    description: "Value printed by a shell command"
  - name: active_connections
    type: http
    url: "{base}/status"
    interval: 60
    metric_type: gauge
    parser:
      type: json
      json_path: "connections.active"
  - name: idle_second
    type: http
    url: "{base}/status"
    interval: 60
    metric_type: gauge
    parser:
      type: json
      json_path: "connections.idle.1"
  - name: uptime_seconds_total
    type: http
    url: "{base}/plain"
    interval: 60
    metric_type: counter
    parser:
      type: split
      split: " "
      index: 1
  - name: file_line
    type: file
    file_path: "{file}"
    interval: 60
    parser:
      type: line
      line_num: 1
  - name: broken_command
    type: command
    command: "exit 1"
    interval: 60
  - name: overloaded_backlog
    type: http
    url: "{base}/overloaded"
    interval: 60
"#,
        base = base,
        file = data_file.path().display(),
    ));

    let config = load_config(config_file.path()).unwrap();
    let collector = Arc::new(ExporterCollector::new(&config).unwrap());

    let app = create_router(AppState::new(collector.clone()));
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8_lossy(&bytes);

    assert!(body.contains("# HELP shell_value Value printed by a shell command"));
    assert!(body.contains("shell_value{source=\"shell\"} 42.5"));
    assert!(body.contains("active_connections 7"));
    assert!(body.contains("idle_second 2"));
    assert!(body.contains("# TYPE uptime_seconds_total counter"));
    assert!(body.contains("uptime_seconds_total 3600"));
    assert!(body.contains("file_line 41.5"));
    assert!(body.contains("broken_command 0"));
    assert!(body.contains("overloaded_backlog 12"));

    let cache = collector.cache();
    assert_eq!(cache.len().await, 7);
    assert_eq!(cache.get("file_line").await.unwrap().value, 41.5);
}

#[tokio::test]
async fn test_file_changes_are_picked_up_only_after_interval() {
    let mut data_file = NamedTempFile::new().unwrap();
    write!(data_file, "1").unwrap();

    let config = ExporterConfig {
        exporters: vec![ExporterSpec {
            name: "cached_file".to_string(),
            source: SourceSpec::File {
                file_path: data_file.path().to_string_lossy().into_owned(),
            },
            interval: 3600,
            metric_type: MetricKind::Gauge,
            parser: ParserSpec::Raw,
            labels: Default::default(),
            description: "cached".to_string(),
        }],
    };
    let collector = ExporterCollector::new(&config).unwrap();

    let first = collector.collect().await;
    std::fs::write(data_file.path(), "2").unwrap();
    let second = collector.collect().await;

    assert_eq!(first[0].get_metric()[0].get_gauge().get_value(), 1.0);
    assert_eq!(second[0].get_metric()[0].get_gauge().get_value(), 1.0);
}
