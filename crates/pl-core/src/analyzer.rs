use crate::discovery::{discover_graph, DfgMiner};
use crate::error::ProcessError;
use crate::insights::{InsightOutcome, InsightService};
use crate::normalize::load_event_log;
use crate::types::{AnalysisResult, InsightReport, ProcessGraph};
use std::path::Path;
use std::sync::Arc;

/// Runs the discovery and review stages of one analysis.
pub struct ProcessAnalyzer {
    miner: Arc<dyn DfgMiner>,
    insights: InsightService,
}

impl ProcessAnalyzer {
    pub fn new(miner: Arc<dyn DfgMiner>, insights: InsightService) -> Self {
        Self { miner, insights }
    }

    /// Blocking: reads and parses the file before mining it.
    pub fn discover_file(
        &self,
        path: &Path,
        original_filename: &str,
    ) -> Result<ProcessGraph, ProcessError> {
        let log = load_event_log(path, original_filename)?;
        tracing::info!(
            traces = log.traces().len(),
            events = log.event_count(),
            "event log normalized"
        );
        let graph = discover_graph(self.miner.as_ref(), &log)?;
        tracing::info!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "process graph discovered"
        );
        Ok(graph)
    }

    /// Never fails: an unreachable model or an unreviewable graph yields the
    /// placeholder report.
    pub async fn review(&self, graph: &ProcessGraph, summary: Option<&str>) -> InsightReport {
        match self.insights.request(graph, summary).await {
            Ok(InsightOutcome::Ready(report) | InsightOutcome::Malformed(report)) => report,
            Ok(InsightOutcome::Unavailable { reason }) => {
                tracing::warn!(%reason, "LLM insights unavailable, returning graph with placeholder");
                InsightReport::unavailable()
            }
            Err(err) => {
                tracing::warn!(error = %err, "graph not eligible for LLM review");
                InsightReport::unavailable()
            }
        }
    }

    pub async fn analyze(&self, graph: ProcessGraph) -> AnalysisResult {
        let summary = graph.describe();
        let llm_insights = self.review(&graph, Some(&summary)).await;
        AnalysisResult {
            process_graph: graph,
            llm_insights,
        }
    }
}
