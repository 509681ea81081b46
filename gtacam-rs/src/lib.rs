//! Shared library surface for the gtacam-rs CLI

pub mod cli;
pub mod commands;
pub mod utils;
