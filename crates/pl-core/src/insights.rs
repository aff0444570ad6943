use crate::cache::{cache_key, InsightCache};
use crate::error::InsightError;
use crate::prompt::build_prompt;
use crate::types::{InsightReport, ProcessGraph};
use pl_llm::{LlmClient, LlmError};
use std::sync::Arc;

pub const MALFORMED_SUMMARY: &str = "Error: LLM returned malformed JSON.";
pub const UNEXPECTED_SUMMARY: &str = "Error: Unexpected response from LLM.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    /// Parsed review, fresh or from the cache.
    Ready(InsightReport),
    /// The model answered but the answer was unusable.
    Malformed(InsightReport),
    /// The endpoint could not be reached or refused the request.
    Unavailable { reason: String },
}

pub struct InsightService {
    client: Arc<dyn LlmClient>,
    cache: Arc<dyn InsightCache>,
}

impl InsightService {
    pub fn new(client: Arc<dyn LlmClient>, cache: Arc<dyn InsightCache>) -> Self {
        Self { client, cache }
    }

    pub async fn request(
        &self,
        graph: &ProcessGraph,
        summary: Option<&str>,
    ) -> Result<InsightOutcome, InsightError> {
        validate_graph(graph)?;

        let key = cache_key(graph, summary);
        if let Some(report) = self.cache.get(&key) {
            tracing::debug!(%key, "returning cached insights");
            return Ok(InsightOutcome::Ready(report));
        }

        let prompt = build_prompt(graph, summary)?;
        let text = match self.client.generate(&prompt).await {
            Ok(text) => text,
            Err(err) if err.is_unavailable() => {
                tracing::warn!(model = self.client.model(), error = %err, "LLM endpoint unavailable");
                return Ok(InsightOutcome::Unavailable {
                    reason: err.to_string(),
                });
            }
            Err(LlmError::Api { message }) => {
                tracing::warn!(model = self.client.model(), %message, "LLM API returned an error");
                return Ok(InsightOutcome::Malformed(InsightReport::degraded(format!(
                    "Error: Ollama API error - {message}"
                ))));
            }
            Err(err) => {
                tracing::warn!(model = self.client.model(), error = %err, "unexpected LLM reply");
                return Ok(InsightOutcome::Malformed(InsightReport::degraded(
                    UNEXPECTED_SUMMARY,
                )));
            }
        };

        match parse_report(&text) {
            Ok(report) => {
                self.cache.put(key, report.clone());
                tracing::info!(model = self.client.model(), "parsed LLM insights");
                Ok(InsightOutcome::Ready(report))
            }
            Err(err) => {
                tracing::warn!(error = %err, raw = %text, "LLM reply is not a valid insight report");
                Ok(InsightOutcome::Malformed(InsightReport::degraded(
                    MALFORMED_SUMMARY,
                )))
            }
        }
    }
}

fn validate_graph(graph: &ProcessGraph) -> Result<(), InsightError> {
    if graph.nodes.is_empty() || graph.links.is_empty() {
        return Err(InsightError::InvalidGraphInput {
            reason: "graph has no nodes or no links".to_string(),
        });
    }
    if let Some(link) = graph.dangling_link() {
        return Err(InsightError::InvalidGraphInput {
            reason: format!(
                "link {} -> {} references an unknown activity",
                link.source, link.target
            ),
        });
    }
    Ok(())
}

/// Parses a model reply into a report, truncating over-long lists.
pub fn parse_report(text: &str) -> Result<InsightReport, serde_json::Error> {
    let mut report: InsightReport = serde_json::from_str(text.trim())?;
    report.truncate_to_limits();
    Ok(report)
}
