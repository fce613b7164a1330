pub mod job;
pub mod pipeline;

pub use self::job::AnalysisJob;
pub use self::pipeline::{AnalysisReport, Pipeline};
