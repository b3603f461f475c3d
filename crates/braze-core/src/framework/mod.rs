//! Framework layer - Rule storage, matching and dispatch.
//!
//! This module contains the dispatch pipeline:
//! - Scope-qualified rule storage with fail-loud pattern compilation
//! - Scope classification and prefix-anchored pattern matching
//! - Guarded, isolated per-event rule execution

pub mod dispatcher;
pub mod matcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use matcher::Matcher;
pub use registry::{PatternBucket, RuleRegistry};
