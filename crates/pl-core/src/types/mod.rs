pub mod analysis;
pub mod graph;
pub mod insight;
pub mod log;

pub use analysis::AnalysisResult;
pub use graph::{Link, Node, ProcessGraph};
pub use insight::{Anomaly, Bottleneck, Inefficiency, InsightReport, ReworkLoop};
pub use log::{EventLog, EventRecord, LogFormat, Trace};
