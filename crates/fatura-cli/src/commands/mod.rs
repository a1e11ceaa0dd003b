//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod ner;
pub mod process;
