//! GridLens service layer: tiered spreadsheet retrieval, caching, and
//! bounded analysis responses.

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod insights;
pub mod orchestrator;
pub mod overflow;
pub mod pipeline;
pub mod source;
pub mod tiers;
pub mod types;

pub use cache::{MemoryTierCache, TierCache};
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use orchestrator::TierFetcher;
pub use overflow::{MemoryResultSink, ResultSink};
pub use pipeline::SheetAnalyzer;
pub use source::{SheetSource, ValueRender};
pub use types::{AnalyzeRequest, ComprehensiveResult, SheetAnalysis};
