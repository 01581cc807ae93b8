//! Aggregation of attributions for the selected resource.
//!
//! Everything here is pure: the same functions run on the calling thread or
//! inside the rollup worker (see [`crate::worker`]).

mod children;
mod hashes;
mod panel;

pub use children::{
    AttributionIdWithCount, compare_package_names, compute_aggregated_attributions_from_children,
};
pub use hashes::{attribution_hash, compute_attributions_to_hashes, group_by_hash};
pub use panel::{PackagePanelTitle, PanelData, PanelDataInput, get_panel_data};
