//! **Attribution aggregation and curation state for open-source license audits.**
//!
//! `opossum-tools` is the core of an attribution-curation workflow: a scanned
//! file tree, automatically detected attributions ("signals") and manually
//! entered attributions linked to its resources, and the state machine that
//! keeps a user's unsaved edits from getting lost while they move around.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: The resource tree, [`PackageInfo`] records, their editable
//!   [`DisplayPackageInfo`] projection and the [`AttributionData`] dataset with
//!   its bidirectional resource/attribution index.
//! - **[`store`]**: Loaded project state and the save resolution that decides
//!   between create, link, replace, update and delete.
//! - **[`aggregation`]**: Panel data for a selected resource, counting
//!   attributions found below folders and merging signals by content hash.
//! - **[`navigation`]**: [`AppState`], the navigation/save guard. Every
//!   selection change goes through it; a dirty edit buffer parks the
//!   navigation behind a confirmation popup.
//! - **[`worker`]**: [`RollupBridge`] offloads panel computation to worker
//!   threads and discards replies of superseded requests.
//! - **[`filters`]**: Attribution filters, sorting and locate queries.
//! - **[`links`]**: Source URLs of resources.
//! - **[`pipeline`]**: Loading snapshots and persisting saves.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use opossum_tools::pipeline::{JsonFileSink, LinkCheck, load_file_content};
//! use opossum_tools::{AppState, SaveScope};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let content = load_file_content(Path::new("project.json"), LinkCheck::Lenient)?;
//!
//!     let mut state = AppState::new().with_sink(JsonFileSink::new("saved.json"));
//!     state.load_from_file(content);
//!
//!     state.set_selected_resource_id_or_open_unsaved_popup("/src/main.rs");
//!     state.edit_temporary_display_package_info(|info| {
//!         info.package_name = Some("serde".to_string());
//!     });
//!     state.save(SaveScope::SelectedResource);
//!
//!     for panel in state.panel_data() {
//!         println!("{}: {} cards", panel.title, panel.attribution_ids_with_count.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `opossum-tools` binary exposes panels, locate queries and source links
//! over a JSON project snapshot.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Counts and confidences stay far below the limits of the casted types
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // PackageInfo mirrors a record format with many independent flags
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    // Variable names like `old_id`/`new_id` are clear in context
    clippy::similar_names
)]

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod links;
pub mod model;
pub mod navigation;
pub mod pipeline;
pub mod store;
pub mod utils;
pub mod worker;

// Re-export main types for convenience
pub use aggregation::{
    AttributionIdWithCount, PackagePanelTitle, PanelData, PanelDataInput,
    compute_aggregated_attributions_from_children, get_panel_data,
};
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset, FilterConfig, WorkerConfig};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, OpossumError, OptionContext, Result};
pub use filters::{
    ActiveFilters, CycleFilter, Filter, FilterState, LocateFilters, LocatedResources,
    SelectedCriticality, SortOption, locate_resources,
};
pub use links::{LinkOpener, get_url_for_resource};
pub use model::{
    AttributionData, AttributionId, DisplayPackageInfo, PackageInfo, ParsedFileContent,
    ResourceId, Resources, SaveFileArgs,
};
pub use navigation::{
    AllowedSaveOperations, AppState, GuardState, PopupType, SaveOutcome, SaveScope, SaveSink,
    View,
};
pub use store::{ResourceState, SaveOperation};
pub use worker::{RollupBridge, RollupHandle, RollupRequest, RollupWorker};
