//! Navigation and save guard.
//!
//! [`AppState`] owns the loaded data, the current selection, the popup stack
//! and the single edit buffer (`temporary_display_package_info`). Every
//! navigation intent is checked against the edit buffer first:
//!
//! - **Clean**: the navigation runs and the buffer is re-derived from the
//!   newly selected record.
//! - **Dirty**: the destination is parked as the navigation target and a
//!   `NotSavedPopup` is opened. The user then saves, discards or cancels.
//!
//! Saves go through a permission check and, for records that were preferred
//! before, through an extra confirmation.

mod nav_impl;
mod save_impl;
mod state;
mod types;

pub use state::AppState;
pub use types::{
    AllowedSaveOperations, GuardState, NavigationTarget, PanelPackage, PopupInfo, PopupType,
    SaveOutcome, SaveScope, SaveSink, View, package_card_id,
};
