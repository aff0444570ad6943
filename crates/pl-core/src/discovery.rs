use crate::error::DiscoveryError;
use crate::types::{EventLog, Link, Node, ProcessGraph};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Raw directly-follows output, before it is shaped into a [`ProcessGraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dfg {
    pub edges: HashMap<(String, String), u64>,
    pub start_activities: HashSet<String>,
    pub end_activities: HashSet<String>,
    pub activity_frequencies: HashMap<String, u64>,
}

pub trait DfgMiner: Send + Sync {
    fn discover(&self, log: &EventLog) -> Result<Dfg, DiscoveryError>;
}

/// Counts adjacent activity pairs within each trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectlyFollowsMiner;

impl DfgMiner for DirectlyFollowsMiner {
    fn discover(&self, log: &EventLog) -> Result<Dfg, DiscoveryError> {
        let mut dfg = Dfg::default();
        for trace in log.traces() {
            let activities: Vec<&str> = trace.activities().collect();
            let (Some(first), Some(last)) = (activities.first(), activities.last()) else {
                continue;
            };
            dfg.start_activities.insert((*first).to_string());
            dfg.end_activities.insert((*last).to_string());

            for activity in &activities {
                *dfg.activity_frequencies
                    .entry((*activity).to_string())
                    .or_insert(0) += 1;
            }
            for pair in activities.windows(2) {
                *dfg.edges
                    .entry((pair[0].to_string(), pair[1].to_string()))
                    .or_insert(0) += 1;
            }
        }
        Ok(dfg)
    }
}

pub fn discover_graph(miner: &dyn DfgMiner, log: &EventLog) -> Result<ProcessGraph, DiscoveryError> {
    let dfg = miner.discover(log)?;
    Ok(graph_from_dfg(&dfg))
}

/// Nodes are every edge endpoint plus declared start/end activities.
pub fn graph_from_dfg(dfg: &Dfg) -> ProcessGraph {
    let mut activities: BTreeSet<&str> = BTreeSet::new();
    for (source, target) in dfg.edges.keys() {
        activities.insert(source.as_str());
        activities.insert(target.as_str());
    }
    activities.extend(dfg.start_activities.iter().map(String::as_str));
    activities.extend(dfg.end_activities.iter().map(String::as_str));

    let nodes = activities
        .into_iter()
        .map(|activity| {
            let frequency = dfg
                .activity_frequencies
                .get(activity)
                .copied()
                .unwrap_or(0);
            Node::for_activity(activity, frequency)
        })
        .collect();

    let mut links: Vec<Link> = dfg
        .edges
        .iter()
        .map(|((source, target), count)| Link::new(source, target, *count))
        .collect();
    links.sort_by(|left, right| {
        (left.source.as_str(), left.target.as_str())
            .cmp(&(right.source.as_str(), right.target.as_str()))
    });

    ProcessGraph { nodes, links }
}
