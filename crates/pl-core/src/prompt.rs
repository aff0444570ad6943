use crate::error::InsightError;
use crate::types::insight::{MAX_ANOMALIES, MAX_BOTTLENECKS, MAX_INEFFICIENCIES, MAX_REWORK_LOOPS};
use crate::types::ProcessGraph;

pub const NO_SUMMARY_PLACEHOLDER: &str = "No additional summary provided.";

const OUTPUT_SHAPE: &str = r#"{
  "summary": "string",
  "bottlenecks": [{ "activity": "string", "reason": "string" }],
  "rework_loops": [{ "loop": ["string", "..."], "impact": "string" }],
  "inefficiencies": [{ "observation": "string", "suggestion": "string (optional)" }],
  "anomalies": [{ "item": "string (activity name or path A->B)", "description": "string" }]
}"#;

pub fn build_prompt(graph: &ProcessGraph, summary: Option<&str>) -> Result<String, InsightError> {
    let nodes = serde_json::to_string_pretty(&graph.nodes).map_err(serialize_error)?;
    let links = serde_json::to_string_pretty(&graph.links).map_err(serialize_error)?;
    let summary = summary
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_SUMMARY_PLACEHOLDER);

    Ok(format!(
        "You are an expert process mining analyst. Review the directly-follows graph below, \
which was discovered from an event log.

Activities (nodes, with occurrence frequency):
{nodes}

Transitions (links, with traversal count):
{links}

Process summary:
{summary}

Using only this data, report:
1. summary: a one or two sentence assessment of the process.
2. bottlenecks: activities likely to be bottlenecks, e.g. high frequency, long duration when \
available, or convergence points with many heavily used incoming paths. At most {MAX_BOTTLENECKS}.
3. rework_loops: activity sequences that return to an earlier activity, such as A -> B -> A, \
as visible in the links. At most {MAX_REWORK_LOOPS}.
4. inefficiencies: notable patterns such as rare exception paths or the dominant happy path, \
optionally with a suggestion. At most {MAX_INEFFICIENCIES}.
5. anomalies: unusual transitions or activities. At most {MAX_ANOMALIES}.

Respond with exactly one minified JSON object of this shape and nothing else:
{OUTPUT_SHAPE}
All five fields are required; use empty lists when there is nothing to report."
    ))
}

fn serialize_error(err: serde_json::Error) -> InsightError {
    InsightError::InvalidGraphInput {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Link, Node};

    fn graph() -> ProcessGraph {
        ProcessGraph {
            nodes: vec![Node::for_activity("Ship Order", 12)],
            links: vec![Link::new("Ship Order", "Ship Order", 3)],
        }
    }

    #[test]
    fn embeds_graph_and_summary() {
        let prompt = build_prompt(&graph(), Some("Orders loop back to shipping.")).unwrap();
        assert!(prompt.contains("\"id\": \"Ship Order\""));
        assert!(prompt.contains("\"count\": 3"));
        assert!(prompt.contains("Orders loop back to shipping."));
        assert!(prompt.contains("\"rework_loops\""));
        assert!(!prompt.contains(NO_SUMMARY_PLACEHOLDER));
    }

    #[test]
    fn blank_summary_uses_placeholder() {
        let prompt = build_prompt(&graph(), Some("   ")).unwrap();
        assert!(prompt.contains(NO_SUMMARY_PLACEHOLDER));
        let prompt = build_prompt(&graph(), None).unwrap();
        assert!(prompt.contains(NO_SUMMARY_PLACEHOLDER));
    }

    #[test]
    fn states_list_limits() {
        let prompt = build_prompt(&graph(), None).unwrap();
        assert!(prompt.contains("At most 3."));
        assert!(prompt.contains("At most 2."));
    }
}
