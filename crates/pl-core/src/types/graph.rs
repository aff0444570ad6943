use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub frequency: u64,
    pub avg_duration_sec: Option<f64>,
}

impl Node {
    pub fn for_activity(activity: &str, frequency: u64) -> Self {
        Self {
            id: activity.to_string(),
            label: activity.to_string(),
            frequency,
            avg_duration_sec: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub count: u64,
    pub avg_lead_time_sec: Option<f64>,
}

impl Link {
    pub fn new(source: &str, target: &str, count: u64) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            count,
            avg_lead_time_sec: None,
        }
    }
}

/// Directly-follows graph as returned to callers. Node and link order carries
/// no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl ProcessGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.source == source && link.target == target)
    }

    /// First link whose source or target is not a node id.
    pub fn dangling_link(&self) -> Option<&Link> {
        let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        self.links.iter().find(|link| {
            !ids.contains(link.source.as_str()) || !ids.contains(link.target.as_str())
        })
    }

    /// Copy with nodes sorted by id and links by (source, target).
    pub fn canonical(&self) -> Self {
        let mut graph = self.clone();
        graph.nodes.sort_by(|left, right| left.id.cmp(&right.id));
        graph.links.sort_by(|left, right| {
            (left.source.as_str(), left.target.as_str())
                .cmp(&(right.source.as_str(), right.target.as_str()))
        });
        graph
    }

    pub fn describe(&self) -> String {
        format!(
            "The discovered process model has {} activities (nodes) and {} transitions (links).",
            self.nodes.len(),
            self.links.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_unset_durations_as_null() {
        let graph = ProcessGraph {
            nodes: vec![Node::for_activity("A", 2)],
            links: vec![Link::new("A", "A", 1)],
        };
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(
            value,
            json!({
                "nodes": [{ "id": "A", "label": "A", "frequency": 2, "avg_duration_sec": null }],
                "links": [{ "source": "A", "target": "A", "count": 1, "avg_lead_time_sec": null }]
            })
        );
    }

    #[test]
    fn dangling_link_is_detected() {
        let graph = ProcessGraph {
            nodes: vec![Node::for_activity("A", 1)],
            links: vec![Link::new("A", "B", 1)],
        };
        assert_eq!(graph.dangling_link().map(|l| l.target.as_str()), Some("B"));
    }

    #[test]
    fn describe_counts_nodes_and_links() {
        let graph = ProcessGraph {
            nodes: vec![Node::for_activity("A", 1), Node::for_activity("B", 1)],
            links: vec![Link::new("A", "B", 1)],
        };
        assert_eq!(
            graph.describe(),
            "The discovered process model has 2 activities (nodes) and 1 transitions (links)."
        );
    }
}
