//! Boundaries to the external batch queue.
//!
//! The tracker never talks to the queue directly. It goes through two seams:
//!
//! - [`Submitter`]: runs the submission command and hands back its stdout
//! - [`JobObserver`]: inspects and consumes the output/error files the queue writes
//!
//! [`QsubSubmitter`] and [`FsObserver`] are the production implementations; tests swap
//! in in-memory fakes.

pub mod observer;
pub mod submitter;

pub use observer::{FsObserver, JobObserver};
pub use submitter::{QsubSubmitter, Submitter};
