//! Attribution data store.
//!
//! [`ResourceState`] owns everything loaded from a file. The functions in
//! [`save`] resolve user edits into create/link/replace/update/delete
//! operations on the manual dataset while keeping its indexes consistent.

mod resource_state;
pub mod save;

pub use resource_state::ResourceState;
pub use save::{
    SaveOperation, add_signal_to_resource, delete_attribution_on_resource,
    find_matching_attribution, save_for_resource, save_package_info,
    unlink_and_save_package_info,
};
