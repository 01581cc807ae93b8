//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the logic for a specific CLI subcommand.

mod config;
mod locate;
mod panels;
mod url;

pub use config::{ConfigCommand, run_config};
pub use locate::{LocateConfig, run_locate};
pub use panels::{CardSummary, PanelSummary, PanelsConfig, PanelsReport, run_panels, summarize_panel};
pub use url::{SystemOpener, UrlConfig, UrlReport, run_url};
