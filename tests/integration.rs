//! Integration test entry point.
//!
//! Individual test modules live in tests/integration/.
//!
//! Run all integration tests:
//!   cargo test --test integration
//!
//! Run a specific module:
//!   cargo test --test integration rename

#[path = "integration/support.rs"]
mod support;

#[path = "integration/rename_tests.rs"]
mod rename_tests;

#[path = "integration/dataflow_tests.rs"]
mod dataflow_tests;

#[path = "integration/report_tests.rs"]
mod report_tests;
