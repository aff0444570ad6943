use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use pl_core::cache::MemoryInsightCache;
use pl_core::discovery::Dfg;
use pl_core::error::DiscoveryError;
use pl_core::types::insight::UNAVAILABLE_SUMMARY;
use pl_core::types::EventLog;
use pl_core::{DfgMiner, DirectlyFollowsMiner, InsightService, ProcessAnalyzer};
use pl_llm::{LlmClient, LlmError};
use pl_serve::routes::error::{DISCOVERY_MESSAGE, SUCCESS_MESSAGE};
use pl_serve::{app, AppState, ServerConfig};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "proclens-test-boundary";

const ORDER_LOG: &str = "\
case_id,activity,timestamp
1,A,2023-01-01 10:00:00
1,B,2023-01-01 10:05:00
1,C,2023-01-01 10:10:00
2,A,2023-01-01 11:00:00
2,D,2023-01-01 11:05:00
";

const ORDER_XES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<log xes.version="1.0" xmlns="http://www.xes-standard.org/">
  <trace>
    <string key="concept:name" value="1"/>
    <event>
      <string key="concept:name" value="A"/>
      <date key="time:timestamp" value="2023-01-01T10:00:00.000+00:00"/>
    </event>
    <event>
      <string key="concept:name" value="B"/>
      <date key="time:timestamp" value="2023-01-01T10:05:00.000+00:00"/>
    </event>
  </trace>
  <trace>
    <string key="concept:name" value="2"/>
    <event>
      <string key="concept:name" value="A"/>
      <date key="time:timestamp" value="2023-01-01T11:00:00.000+00:00"/>
    </event>
    <event>
      <string key="concept:name" value="B"/>
      <date key="time:timestamp" value="2023-01-01T11:05:00.000+00:00"/>
    </event>
  </trace>
</log>"#;

const REVIEW: &str = r#"{"summary":"Two variants after A.","bottlenecks":[{"activity":"A","reason":"every case starts here"}],"rework_loops":[],"inefficiencies":[],"anomalies":[{"item":"A->D","description":"short path"}]}"#;

enum Reply {
    Review,
    Offline,
}

struct StubClient(Reply);

#[async_trait]
impl LlmClient for StubClient {
    fn model(&self) -> &str {
        "stub"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        match self.0 {
            Reply::Review => Ok(REVIEW.to_string()),
            Reply::Offline => Err(LlmError::Transport {
                reason: "connection refused".to_string(),
            }),
        }
    }
}

struct BrokenMiner;

impl DfgMiner for BrokenMiner {
    fn discover(&self, _log: &EventLog) -> Result<Dfg, DiscoveryError> {
        Err(DiscoveryError::Failed {
            reason: "mining exploded".to_string(),
        })
    }
}

fn state(upload_dir: &Path, miner: Arc<dyn DfgMiner>, reply: Reply) -> AppState {
    let insights = InsightService::new(
        Arc::new(StubClient(reply)),
        Arc::new(MemoryInsightCache::new()),
    );
    let analyzer = ProcessAnalyzer::new(miner, insights);
    let config = ServerConfig {
        upload_dir: Some(upload_dir.to_path_buf()),
        ..ServerConfig::default()
    };
    AppState::new(Arc::new(analyzer), &config)
}

fn multipart_request(field: &str, filename: &str, contents: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
Content-Type: application/octet-stream\r\n\r\n\
{contents}\r\n\
--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/api/process")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn csv_upload_returns_graph_and_insights() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let response = app
        .oneshot(multipart_request("file", "orders.csv", ORDER_LOG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-correlation-id"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], SUCCESS_MESSAGE);

    let graph = &body["data"]["processGraph"];
    let ids: Vec<&str> = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["A", "B", "C", "D"]);
    let links: Vec<(&str, &str, u64)> = graph["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|link| {
            (
                link["source"].as_str().unwrap(),
                link["target"].as_str().unwrap(),
                link["count"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(links, vec![("A", "B", 1), ("A", "D", 1), ("B", "C", 1)]);

    let insights = &body["data"]["llmInsights"];
    assert_eq!(insights["summary"], "Two variants after A.");
    assert_eq!(insights["bottlenecks"][0]["activity"], "A");
    assert_eq!(staged_files(dir.path()), 0);
}

fn link_triples(body: &Value) -> Vec<(String, String, u64)> {
    body["data"]["processGraph"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|link| {
            (
                link["source"].as_str().unwrap().to_string(),
                link["target"].as_str().unwrap().to_string(),
                link["count"].as_u64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn xes_upload_returns_graph() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Offline));

    let response = app
        .oneshot(multipart_request("file", "orders.xes", ORDER_XES))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        link_triples(&body),
        vec![("A".to_string(), "B".to_string(), 2)]
    );
    let frequencies: Vec<(&str, u64)> = body["data"]["processGraph"]["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| (node["id"].as_str().unwrap(), node["frequency"].as_u64().unwrap()))
        .collect();
    assert_eq!(frequencies, vec![("A", 2), ("B", 2)]);
    assert_eq!(staged_files(dir.path()), 0);
}

#[tokio::test]
async fn very_long_filename_is_still_processed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Offline));
    let filename = format!("{}.csv", "a".repeat(300));

    let response = app
        .oneshot(multipart_request("file", &filename, ORDER_LOG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(link_triples(&body).len(), 3);
    assert_eq!(staged_files(dir.path()), 0);
}

#[tokio::test]
async fn unreachable_model_still_succeeds_with_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Offline));

    let response = app
        .oneshot(multipart_request("file", "orders.csv", ORDER_LOG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let insights = &body["data"]["llmInsights"];
    assert_eq!(insights["summary"], UNAVAILABLE_SUMMARY);
    for list in ["bottlenecks", "rework_loops", "inefficiencies", "anomalies"] {
        assert_eq!(insights[list], Value::Array(Vec::new()), "{list}");
    }
    assert_eq!(body["data"]["processGraph"]["links"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn disallowed_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let response = app
        .oneshot(multipart_request("file", "notes.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains(".csv"));
    assert!(message.contains(".xes"));
    assert_eq!(staged_files(dir.path()), 0);
}

#[tokio::test]
async fn missing_column_is_named_and_upload_removed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let response = app
        .oneshot(multipart_request(
            "file",
            "orders.csv",
            "case_id,activity\n1,A\n",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("timestamp"));
    assert_eq!(staged_files(dir.path()), 0);
}

#[tokio::test]
async fn discovery_failure_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(BrokenMiner), Reply::Review));

    let response = app
        .oneshot(multipart_request("file", "orders.csv", ORDER_LOG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], DISCOVERY_MESSAGE);
    assert_eq!(staged_files(dir.path()), 0);
}

#[tokio::test]
async fn missing_file_part_and_empty_filename() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let response = app
        .clone()
        .oneshot(multipart_request("attachment", "orders.csv", ORDER_LOG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "No file part in the request.");

    let response = app
        .oneshot(multipart_request("file", "", ORDER_LOG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "No selected file.");
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let request = Request::builder()
        .method("POST")
        .uri("/api/process")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "No file part in the request.");
}

#[tokio::test]
async fn health_reports_running_and_echoes_correlation_id() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let request = Request::builder()
        .uri("/api/health")
        .header("x-correlation-id", "corr_test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-correlation-id"], "corr_test");

    let body = json_body(response).await;
    assert_eq!(
        body,
        serde_json::json!({"status": "healthy", "message": "Backend is running!"})
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(state(dir.path(), Arc::new(DirectlyFollowsMiner), Reply::Review));

    let request = Request::builder()
        .uri("/api/openapi.json")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["paths"]["/api/process"].is_object());
}
