use crate::types::graph::ProcessGraph;
use crate::types::insight::InsightReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub process_graph: ProcessGraph,
    pub llm_insights: InsightReport,
}
