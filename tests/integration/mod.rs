//! End-to-end publishing scenarios against the in-memory remote store

mod remote_index;
mod support;
mod sync_scenarios;
mod tree_properties;
