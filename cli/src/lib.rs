//! Command-line client for the MythX smart contract analysis service.

pub mod client;
pub mod commands;
pub mod config;
pub mod report;
pub mod utils;
