//! Central application state: loaded data, selection, popups and the edit buffer.

use super::types::{
    AllowedSaveOperations, GuardState, NavigationTarget, PanelPackage, PopupInfo, PopupType,
    SaveSink, View,
};
use crate::aggregation::{PackagePanelTitle, PanelData, get_panel_data};
use crate::model::{
    AttributionId, DisplayPackageInfo, PackageInfo, ParsedFileContent, ROOT_PATH, ResourceId,
    closest_ancestor_with_attributions,
};
use crate::store::ResourceState;
use crate::worker::RollupRequest;
use std::fmt;

/// Everything the navigation guard owns.
///
/// All mutation of the edit buffer and of the manual dataset goes through
/// the methods in this module, so there is a single writer.
pub struct AppState {
    pub(crate) resources: ResourceState,
    pub(crate) view: View,
    pub(crate) selected_resource_id: ResourceId,
    pub(crate) selected_attribution_id: Option<AttributionId>,
    pub(crate) selected_panel_package: Option<PanelPackage>,
    pub(crate) target: NavigationTarget,
    pub(crate) popups: Vec<PopupInfo>,
    pub(crate) temporary_display_package_info: DisplayPackageInfo,
    /// Save of a non-edited attribution waiting for the wasPreferred popup
    pub(crate) pending_variant_save: Option<(AttributionId, PackageInfo)>,
    pub(crate) allowed_save_operations: AllowedSaveOperations,
    pub(crate) open_file_requested: bool,
    pub(crate) sink: Option<Box<dyn SaveSink>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("view", &self.view)
            .field("selected_resource_id", &self.selected_resource_id)
            .field("selected_attribution_id", &self.selected_attribution_id)
            .field("selected_panel_package", &self.selected_panel_package)
            .field("target", &self.target)
            .field("popups", &self.popups)
            .field("allowed_save_operations", &self.allowed_save_operations)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Empty state with no file loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: ResourceState::default(),
            view: View::default(),
            selected_resource_id: ROOT_PATH.to_string(),
            selected_attribution_id: None,
            selected_panel_package: None,
            target: NavigationTarget::default(),
            popups: Vec::new(),
            temporary_display_package_info: DisplayPackageInfo::empty(),
            pending_variant_save: None,
            allowed_save_operations: AllowedSaveOperations::default(),
            open_file_requested: false,
            sink: None,
        }
    }

    /// Attach the sink that receives the save payload.
    #[must_use]
    pub fn with_sink(mut self, sink: impl SaveSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: impl SaveSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub const fn set_allowed_save_operations(&mut self, allowed: AllowedSaveOperations) {
        self.allowed_save_operations = allowed;
    }

    #[must_use]
    pub const fn allowed_save_operations(&self) -> AllowedSaveOperations {
        self.allowed_save_operations
    }

    // ------------------------------------------------------------------
    // Load / close
    // ------------------------------------------------------------------

    /// Replace every dataset with a freshly loaded snapshot.
    pub fn load_from_file(&mut self, content: ParsedFileContent) {
        let allowed = self.allowed_save_operations;
        let sink = self.sink.take();
        *self = Self {
            resources: ResourceState::from_file_content(content),
            allowed_save_operations: allowed,
            sink,
            ..Self::new()
        };
        self.select_first_manual_attribution();
        self.reset_temporary_display_package_info();
    }

    /// Drop the loaded file and all selection state.
    pub fn close_file(&mut self) {
        let allowed = self.allowed_save_operations;
        let sink = self.sink.take();
        *self = Self {
            allowed_save_operations: allowed,
            sink,
            ..Self::new()
        };
        tracing::info!("Closed project");
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn resource_state(&self) -> &ResourceState {
        &self.resources
    }

    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn selected_resource_id(&self) -> &str {
        &self.selected_resource_id
    }

    #[must_use]
    pub fn selected_attribution_id(&self) -> Option<&str> {
        self.selected_attribution_id.as_deref()
    }

    #[must_use]
    pub const fn selected_panel_package(&self) -> Option<&PanelPackage> {
        self.selected_panel_package.as_ref()
    }

    #[must_use]
    pub fn target_selected_resource_id(&self) -> Option<&str> {
        self.target.resource_id.as_deref()
    }

    #[must_use]
    pub fn target_selected_attribution_id(&self) -> Option<&str> {
        self.target.attribution_id.as_deref()
    }

    #[must_use]
    pub const fn target_view(&self) -> Option<View> {
        self.target.view
    }

    #[must_use]
    pub const fn target(&self) -> &NavigationTarget {
        &self.target
    }

    #[must_use]
    pub const fn temporary_display_package_info(&self) -> &DisplayPackageInfo {
        &self.temporary_display_package_info
    }

    /// Consume a pending request to open another file.
    pub fn take_open_file_request(&mut self) -> bool {
        std::mem::take(&mut self.open_file_requested)
    }

    /// Id of the attribution the edit buffer belongs to, in the current view.
    #[must_use]
    pub fn active_attribution_id(&self) -> Option<&AttributionId> {
        match self.view {
            View::Audit => self
                .selected_panel_package
                .as_ref()
                .and_then(PanelPackage::attribution_id),
            View::Attribution | View::Report => self.selected_attribution_id.as_ref(),
        }
    }

    /// Manual attribution ids shown for the selected resource.
    ///
    /// A resource without its own attributions inherits those of the
    /// closest ancestor that has some, unless a breakpoint is in between.
    #[must_use]
    pub fn manual_attribution_ids_of_selected_resource(&self) -> Vec<AttributionId> {
        let manual = self.resources.manual_data();
        let own = manual.attribution_ids_of(&self.selected_resource_id);
        if !own.is_empty() {
            return own.to_vec();
        }
        closest_ancestor_with_attributions(
            &self.selected_resource_id,
            &self.resources.attribution_breakpoints,
            |parent| !manual.attribution_ids_of(parent).is_empty(),
        )
        .map(|parent| manual.attribution_ids_of(&parent).to_vec())
        .unwrap_or_default()
    }

    /// Panels for the selected resource, computed on the calling thread.
    #[must_use]
    pub fn panel_data(&self) -> Vec<PanelData> {
        get_panel_data(&self.resources.panel_input(&self.selected_resource_id))
    }

    /// Owned snapshot for computing the panels elsewhere.
    #[must_use]
    pub fn rollup_request(&self) -> RollupRequest {
        RollupRequest::from_state(&self.resources, self.selected_resource_id.clone())
    }

    // ------------------------------------------------------------------
    // Guard
    // ------------------------------------------------------------------

    /// Persisted value the edit buffer shadows.
    #[must_use]
    pub fn persisted_display_package_info(&self) -> DisplayPackageInfo {
        let manual = self.resources.manual_data();
        match self.view {
            View::Audit => match &self.selected_panel_package {
                Some(package) if package.panel == PackagePanelTitle::ManualPackages => package
                    .attribution_id()
                    .and_then(|id| manual.get(id))
                    .map_or_else(DisplayPackageInfo::empty, DisplayPackageInfo::from),
                Some(package) => package.display_package_info.clone(),
                None => DisplayPackageInfo::empty(),
            },
            View::Attribution | View::Report => self
                .selected_attribution_id
                .as_deref()
                .and_then(|id| manual.get(id))
                .map_or_else(DisplayPackageInfo::empty, DisplayPackageInfo::from),
        }
    }

    /// Whether the edit buffer differs from the record it shadows.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self
            .temporary_display_package_info
            .is_equivalent_to(&self.persisted_display_package_info())
    }

    #[must_use]
    pub fn guard_state(&self) -> GuardState {
        if self.is_popup_open(PopupType::NotSavedPopup) {
            GuardState::AwaitingConfirmation
        } else if self.is_dirty() {
            GuardState::Dirty
        } else {
            GuardState::Clean
        }
    }

    /// Re-derive the edit buffer from the current selection.
    pub fn reset_temporary_display_package_info(&mut self) {
        self.temporary_display_package_info = self.persisted_display_package_info();
    }

    /// Replace the edit buffer.
    pub fn update_temporary_display_package_info(&mut self, info: DisplayPackageInfo) {
        self.temporary_display_package_info = info;
    }

    /// Edit the buffer in place.
    pub fn edit_temporary_display_package_info(&mut self, edit: impl FnOnce(&mut DisplayPackageInfo)) {
        edit(&mut self.temporary_display_package_info);
    }

    // ------------------------------------------------------------------
    // Popups
    // ------------------------------------------------------------------

    pub fn open_popup(&mut self, popup: PopupType, attribution_id: Option<AttributionId>) {
        tracing::debug!(?popup, "Opening popup");
        self.popups.push(PopupInfo {
            popup,
            attribution_id,
        });
    }

    /// Close the top-most popup.
    pub fn close_popup(&mut self) -> Option<PopupInfo> {
        self.popups.pop()
    }

    #[must_use]
    pub fn current_popup(&self) -> Option<&PopupInfo> {
        self.popups.last()
    }

    #[must_use]
    pub fn is_popup_open(&self, popup: PopupType) -> bool {
        self.popups.iter().any(|info| info.popup == popup)
    }

    pub(crate) fn remove_popup(&mut self, popup: PopupType) {
        self.popups.retain(|info| info.popup != popup);
    }

    // ------------------------------------------------------------------
    // Selection helpers
    // ------------------------------------------------------------------

    /// Select the first manual attribution of the selected resource, if any.
    pub(crate) fn select_first_manual_attribution(&mut self) {
        self.selected_panel_package = self
            .manual_attribution_ids_of_selected_resource()
            .first()
            .and_then(|id| self.resources.manual_data().get(id))
            .map(|record| {
                PanelPackage::new(
                    PackagePanelTitle::ManualPackages,
                    0,
                    DisplayPackageInfo::from(record),
                )
            });
    }

    pub(crate) fn debug_assert_resource(&self, resource_id: &str) {
        debug_assert!(
            !self.resources.is_loaded() || self.resources.resources.contains(resource_id),
            "unknown resource id {resource_id}"
        );
    }
}
