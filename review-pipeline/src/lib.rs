pub mod filter;
pub mod job;
pub mod pipeline;
pub mod tally;

pub use filter::{parse_review_date, ReportFilter};
pub use job::BatchJob;
pub use pipeline::ReviewPipeline;
pub use tally::Tally;
