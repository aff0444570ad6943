use crate::routes::error::ApiEnvelope;
use crate::routes::health::HealthStatus;
use crate::routes::process::UploadForm;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use pl_core::types::{
    AnalysisResult, Anomaly, Bottleneck, Inefficiency, InsightReport, Link, Node, ProcessGraph,
    ReworkLoop,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "proclens", description = "Event log process discovery with LLM review"),
    paths(crate::routes::process::process_log, crate::routes::health::health),
    components(schemas(
        ApiEnvelope,
        UploadForm,
        HealthStatus,
        AnalysisResult,
        ProcessGraph,
        Node,
        Link,
        InsightReport,
        Bottleneck,
        ReworkLoop,
        Inefficiency,
        Anomaly
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_both_endpoints() {
        let spec: serde_json::Value = serde_json::from_str(&generate_spec()).unwrap();
        assert!(spec["paths"]["/api/process"]["post"].is_object());
        assert!(spec["paths"]["/api/health"]["get"].is_object());
        assert!(spec["components"]["schemas"]["ApiEnvelope"].is_object());
        assert!(spec["components"]["schemas"]["InsightReport"].is_object());
    }
}
