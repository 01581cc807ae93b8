//! Navigation intents and the unsaved-changes popup.

use super::state::AppState;
use super::types::{NavigationTarget, PanelPackage, PopupType, SaveOutcome, SaveScope, View};
use crate::error::OpossumError;
use crate::links::{LinkOpener, get_url_for_resource};
use crate::model::{AttributionId, ResourceId};

impl AppState {
    /// Run a navigation intent, or park it behind a `NotSavedPopup` when
    /// the edit buffer has unsaved changes.
    ///
    /// Returns `true` if the navigation happened immediately.
    pub fn navigate_or_open_unsaved_popup(&mut self, target: NavigationTarget) -> bool {
        if target.is_empty() {
            return true;
        }
        if self.is_dirty() {
            tracing::debug!(?target, "Unsaved changes, asking for confirmation");
            self.target = target;
            if !self.is_popup_open(PopupType::NotSavedPopup) {
                self.open_popup(PopupType::NotSavedPopup, None);
            }
            return false;
        }
        self.apply_navigation(target);
        true
    }

    pub fn set_selected_resource_id_or_open_unsaved_popup(
        &mut self,
        resource_id: impl Into<ResourceId>,
    ) -> bool {
        self.navigate_or_open_unsaved_popup(NavigationTarget::resource(resource_id))
    }

    pub fn set_selected_attribution_id_or_open_unsaved_popup(
        &mut self,
        attribution_id: impl Into<AttributionId>,
    ) -> bool {
        self.navigate_or_open_unsaved_popup(NavigationTarget::attribution(attribution_id))
    }

    pub fn select_package_card_or_open_unsaved_popup(&mut self, panel_package: PanelPackage) -> bool {
        self.navigate_or_open_unsaved_popup(NavigationTarget::panel_package(panel_package))
    }

    pub fn set_view_or_open_unsaved_popup(&mut self, view: View) -> bool {
        if view == self.view {
            return true;
        }
        self.navigate_or_open_unsaved_popup(NavigationTarget::view(view))
    }

    pub fn open_file_or_open_unsaved_popup(&mut self) -> bool {
        self.navigate_or_open_unsaved_popup(NavigationTarget::open_file())
    }

    /// Jump to a resource in the audit view, e.g. from the attribution list.
    pub fn navigate_to_selected_path_or_open_unsaved_popup(
        &mut self,
        resource_id: impl Into<ResourceId>,
    ) -> bool {
        self.navigate_or_open_unsaved_popup(NavigationTarget {
            resource_id: Some(resource_id.into()),
            view: Some(View::Audit),
            ..NavigationTarget::default()
        })
    }

    /// "Discard": drop the edit and run the parked navigation.
    pub fn discard_and_continue(&mut self) {
        let target = std::mem::take(&mut self.target);
        self.remove_popup(PopupType::NotSavedPopup);
        self.apply_navigation(target);
    }

    /// "Cancel": drop the parked navigation and keep editing.
    pub fn cancel_navigation(&mut self) {
        self.target = NavigationTarget::default();
        self.remove_popup(PopupType::NotSavedPopup);
    }

    /// "Save": save the edit, then run the parked navigation.
    ///
    /// If the save needs another confirmation the navigation stays parked
    /// until that confirmation completes the save.
    pub fn save_and_continue(&mut self, scope: SaveScope) -> SaveOutcome {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        self.remove_popup(PopupType::NotSavedPopup);
        let outcome = self.save(scope);
        if outcome.is_saved() {
            self.continue_parked_navigation();
        }
        outcome
    }

    pub(crate) fn continue_parked_navigation(&mut self) {
        let target = std::mem::take(&mut self.target);
        if !target.is_empty() {
            self.apply_navigation(target);
        }
    }

    /// Source URL of a resource from the base-URL table.
    #[must_use]
    pub fn resource_url(&self, resource_id: &str) -> Option<String> {
        get_url_for_resource(
            resource_id,
            &self.resources.base_urls_for_sources,
            &self.resources.attribution_breakpoints,
        )
    }

    /// Resolve a resource's source URL and hand it to `opener`.
    ///
    /// Failures open an `InvalidLinkPopup`; selection and edits are untouched.
    pub fn open_resource_link(&mut self, resource_id: &str, opener: &dyn LinkOpener) -> Option<String> {
        let url = self.resource_url(resource_id);
        let result = match &url {
            Some(url) => opener.open(url),
            None => Err(OpossumError::validation(format!("No URL for {resource_id}"))),
        };
        match result {
            Ok(()) => url,
            Err(err) => {
                tracing::warn!(resource_id, error = %err, "Could not open link");
                self.open_popup(PopupType::InvalidLinkPopup, None);
                None
            }
        }
    }

    /// Execute a navigation and re-derive the edit buffer.
    pub(crate) fn apply_navigation(&mut self, target: NavigationTarget) {
        let NavigationTarget {
            resource_id,
            attribution_id,
            view,
            panel_package,
            open_file,
        } = target;

        if let Some(view) = view {
            self.view = view;
        }
        if let Some(resource_id) = resource_id {
            self.debug_assert_resource(&resource_id);
            self.selected_resource_id = resource_id;
            if self.view == View::Audit && panel_package.is_none() {
                self.select_first_manual_attribution();
            }
        }
        if let Some(attribution_id) = attribution_id {
            self.selected_attribution_id = Some(attribution_id);
        }
        if let Some(panel_package) = panel_package {
            self.selected_panel_package = Some(panel_package);
        }
        if open_file {
            self.open_file_requested = true;
        }
        self.reset_temporary_display_package_info();
    }
}
