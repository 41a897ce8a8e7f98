//! Utility functions and helpers
//!
//! ## Modules
//!
//! - [`util`] - Timing helpers for logging operation durations

pub mod util;
