//! Shared utilities for the gtacam-rs CLI

pub mod progress;
pub mod table;

pub use progress::*;
pub use table::*;
