pub mod config;
pub mod error;
pub mod queue;
pub mod schedule;
pub mod shutdown;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use tracker::{Job, JobStatus, JobSummary, Tracker};
