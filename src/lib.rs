//! md-publish: Incremental Markdown Publishing
//!
//! Publishes a tree of markdown documents to a remote hierarchical page store,
//! using a content-addressed hash tree to skip everything that did not change
//! since the last successful run.

pub mod concurrency;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod remote;
pub mod store;
pub mod sync;
pub mod tooling;
pub mod tree;
pub mod types;
