//! Tokenization pipeline
//!
//! - `stages`: the fifteen text transformations, in execution order
//! - `context`: per-call state threaded through the stages
//! - `runner`: executes the stages and notifies observers
//! - `observer`: hooks for timing and intermediate-text capture

pub mod context;
pub mod observer;
pub mod runner;
pub mod stages;
