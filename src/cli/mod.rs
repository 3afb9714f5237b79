//! CLI module for the trade equalizer

pub mod app;
pub mod commands;

pub use app::{AcceptedDeal, AddedAsset, EqualizationReport, EqualizerApp};
pub use commands::{parse_session_key, Cli, Commands, ContextArgs};
