//! Filtering, sorting and locating over attribution collections.
//!
//! - [`ActiveFilters`]: predicate filters combined by intersection
//! - [`SortOption`]: list ordering
//! - [`LocateFilters`]: resource locating by criticality, license and search term

mod cycle;
mod filter;
mod locate;
mod sort;

pub use cycle::{CycleFilter, FilterState};
pub use filter::{ActiveFilters, Filter, filter_attributions};
pub use locate::{LocateFilters, LocatedResources, SelectedCriticality, locate_resources};
pub use sort::{SortOption, sort_attribution_ids, sort_attributions};
