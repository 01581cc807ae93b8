//! Data model for resources and attributions.
//!
//! - [`Resources`]: the scanned file tree, addressed by slash-delimited ids
//! - [`PackageInfo`]: one attribution record
//! - [`DisplayPackageInfo`]: the editable projection of one or more records
//! - [`AttributionData`]: one dataset (manual or external) with its indexes
//! - [`ParsedFileContent`] / [`SaveFileArgs`]: load and save payloads
//!
//! ```ignore
//! let data = AttributionData::new(attributions, resources_to_attributions);
//! for child in data.resources_with_attributed_children().children_of("/src/") {
//!     println!("{child}: {:?}", data.attribution_ids_of(child));
//! }
//! ```

mod attribution_data;
mod display;
mod file_content;
mod package_info;
mod resources;

pub use attribution_data::*;
pub use display::*;
pub use file_content::*;
pub use package_info::*;
pub use resources::*;
