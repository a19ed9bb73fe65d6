//! CLI command handlers

pub mod commands;

pub use commands::{export, export_range, import, json, load, pack, save};
