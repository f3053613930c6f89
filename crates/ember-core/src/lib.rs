//! Ember Core
//!
//! Shared building blocks for the Ember engine crates: collections, logging,
//! profiling, math and the platform event type.

pub mod alloc;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
pub mod strings;
