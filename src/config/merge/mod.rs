//! Config composition: defaults, file and environment merged into one value.

pub mod merge_policy;
pub mod service;

pub use service::MergeService;
