pub mod analyzer;
pub mod cache;
pub mod discovery;
pub mod error;
pub mod insights;
pub mod normalize;
pub mod prompt;
pub mod timestamp;
pub mod xes;

pub mod types;

pub use crate::analyzer::ProcessAnalyzer;
pub use crate::cache::{InsightCache, MemoryInsightCache};
pub use crate::discovery::{DfgMiner, DirectlyFollowsMiner};
pub use crate::error::ProcessError;
pub use crate::insights::{InsightOutcome, InsightService};
