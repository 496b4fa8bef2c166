//! Registry usage processing for regscope
//!
//! This crate joins image streams to images, sums distinct layer sizes per
//! project, and renders the results.

mod aggregate;
mod format;
mod report;

pub use aggregate::{ImageIndex, Resolved, UsageAggregator, rank, total_usage};
pub use format::format_size;
pub use report::{Report, ReportWriter};

// Re-export types used in our public API
pub use regscope_types::{Image, ImageStream, Project, ProjectUsage};
