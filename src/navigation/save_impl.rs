//! Save, delete and resolve actions.
//!
//! Every mutating action runs in the same order: permission check, store
//! update, selection fix-up, edit buffer reset, sink notification.

use super::state::AppState;
use super::types::{PanelPackage, PopupType, SaveOutcome, SaveScope, View};
use crate::aggregation::PackagePanelTitle;
use crate::model::{AttributionId, DisplayPackageInfo, PackageInfo};
use crate::store::{self, SaveOperation};

impl AppState {
    /// Save the edit buffer.
    ///
    /// Opens `UnableToSavePopup` when saving is disabled and
    /// `ModifyWasPreferredAttributionPopup` when the edited record was
    /// preferred before; in both cases nothing else changes.
    pub fn save(&mut self, scope: SaveScope) -> SaveOutcome {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        if self.temporary_display_package_info.was_preferred {
            let attribution_id = self.editable_attribution_id();
            self.open_popup(PopupType::ModifyWasPreferredAttributionPopup, attribution_id);
            return SaveOutcome::NeedsConfirmation;
        }
        self.commit_save(scope)
    }

    /// Save `package_info` into one attribution, which need not be the one
    /// being edited.
    ///
    /// Goes through the same permission and wasPreferred gates as
    /// [`save`](Self::save). When `attribution_id` is not the active
    /// attribution the edit buffer survives the save.
    pub fn save_attribution(&mut self, attribution_id: &str, package_info: PackageInfo) -> SaveOutcome {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        if package_info.was_preferred {
            self.pending_variant_save = Some((attribution_id.to_string(), package_info));
            self.open_popup(
                PopupType::ModifyWasPreferredAttributionPopup,
                Some(attribution_id.to_string()),
            );
            return SaveOutcome::NeedsConfirmation;
        }
        self.commit_variant_save(attribution_id, &package_info)
    }

    /// Confirm a save of a previously preferred record: the flag is
    /// cleared and the save proceeds, followed by any parked navigation.
    pub fn confirm_modify_was_preferred(&mut self, scope: SaveScope) -> SaveOutcome {
        self.remove_popup(PopupType::ModifyWasPreferredAttributionPopup);
        if !self.allowed_save_operations.allows_save() {
            self.pending_variant_save = None;
            return self.deny_save();
        }
        if let Some((attribution_id, mut package_info)) = self.pending_variant_save.take() {
            package_info.was_preferred = false;
            return self.commit_variant_save(&attribution_id, &package_info);
        }
        self.temporary_display_package_info.was_preferred = false;
        let outcome = self.commit_save(scope);
        self.continue_parked_navigation();
        outcome
    }

    /// Abort a save of a previously preferred record.
    pub fn cancel_modify_was_preferred(&mut self) {
        self.remove_popup(PopupType::ModifyWasPreferredAttributionPopup);
        self.pending_variant_save = None;
    }

    /// Delete a manual attribution from every resource.
    pub fn delete_attribution_globally(&mut self, attribution_id: &str) -> SaveOutcome {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        let operation = match self.resources.manual_data_mut().remove(attribution_id) {
            Some(_) => SaveOperation::Delete {
                attribution_id: attribution_id.to_string(),
            },
            None => SaveOperation::Noop,
        };
        self.finish(operation)
    }

    /// Delete a manual attribution from the selected resource only.
    pub fn delete_attribution_on_selected_resource(&mut self, attribution_id: &str) -> SaveOutcome {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        let resource_id = self.selected_resource_id.clone();
        let operation = store::delete_attribution_on_resource(
            self.resources.manual_data_mut(),
            &resource_id,
            attribution_id,
        );
        self.finish(operation)
    }

    /// Turn a signal into a manual attribution on the selected resource.
    pub fn add_signal_to_selected_resource(&mut self, signal_id: &str) -> SaveOutcome {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        let Some(signal) = self.resources.external_data().get(signal_id).cloned() else {
            tracing::warn!(signal_id, "Ignoring unknown signal");
            return SaveOutcome::Saved(SaveOperation::Noop);
        };
        let resource_id = self.selected_resource_id.clone();
        self.debug_assert_resource(&resource_id);
        let operation =
            store::add_signal_to_resource(self.resources.manual_data_mut(), &resource_id, &signal);
        self.finish(operation)
    }

    /// Mark signals as resolved and persist.
    pub fn resolve_signals<I, S>(&mut self, ids: I) -> SaveOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<AttributionId>,
    {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        let changed = self.resources.resolve_external_attributions(ids);
        if changed > 0 {
            self.notify_sink();
        }
        SaveOutcome::Saved(SaveOperation::Noop)
    }

    /// Undo [`resolve_signals`](Self::resolve_signals) and persist.
    pub fn unresolve_signals<I, S>(&mut self, ids: I) -> SaveOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<AttributionId>,
    {
        if !self.allowed_save_operations.allows_save() {
            return self.deny_save();
        }
        let changed = self.resources.unresolve_external_attributions(ids);
        if changed > 0 {
            self.notify_sink();
        }
        SaveOutcome::Saved(SaveOperation::Noop)
    }

    pub(crate) fn deny_save(&mut self) -> SaveOutcome {
        tracing::info!("Saving is disabled");
        self.open_popup(PopupType::UnableToSavePopup, None);
        SaveOutcome::Denied
    }

    /// Manual attribution the edit buffer belongs to, if it exists.
    fn editable_attribution_id(&self) -> Option<AttributionId> {
        let manual = self.resources.manual_data();
        self.temporary_display_package_info
            .attribution_ids
            .first()
            .filter(|id| manual.contains(id))
            .cloned()
    }

    fn commit_save(&mut self, scope: SaveScope) -> SaveOutcome {
        let package_info = self.temporary_display_package_info.to_package_info();
        let attribution_id = self.editable_attribution_id();
        let resource_id = (self.view == View::Audit).then(|| self.selected_resource_id.clone());
        if let Some(resource_id) = &resource_id {
            self.debug_assert_resource(resource_id);
        }

        let data = self.resources.manual_data_mut();
        let operation = match resource_id.as_deref() {
            Some(resource_id) => store::save_for_resource(
                data,
                resource_id,
                attribution_id.as_deref(),
                &package_info,
                scope == SaveScope::Globally,
            ),
            None => store::save_package_info(data, None, attribution_id.as_deref(), &package_info),
        };
        self.finish(operation)
    }

    fn commit_variant_save(&mut self, attribution_id: &str, package_info: &PackageInfo) -> SaveOutcome {
        let active_before = self.active_attribution_id().cloned();
        let operation = store::save_package_info(
            self.resources.manual_data_mut(),
            None,
            Some(attribution_id),
            package_info,
        );
        let inactive = active_before.as_deref() != Some(attribution_id);
        if !inactive {
            return self.finish(operation);
        }

        self.fix_selection_after(&operation);
        // The buffer belongs to another record; keep it unless the selection moved.
        if self.active_attribution_id() != active_before.as_ref() {
            self.reset_temporary_display_package_info();
        }
        if operation.is_mutation() {
            self.notify_sink();
        }
        tracing::debug!(operation = operation.name(), "Applied save of inactive attribution");
        SaveOutcome::Saved(operation)
    }

    fn finish(&mut self, operation: SaveOperation) -> SaveOutcome {
        tracing::debug!(operation = operation.name(), "Applied save");
        self.fix_selection_after(&operation);
        self.reset_temporary_display_package_info();
        if operation.is_mutation() {
            self.notify_sink();
        }
        SaveOutcome::Saved(operation)
    }

    /// Point the selection at the record the saved content now lives in.
    ///
    /// Both the audit card and the attribution-view selection are repaired,
    /// whichever view is showing, so neither keeps a removed id.
    fn fix_selection_after(&mut self, operation: &SaveOperation) {
        let (affected, resulting) = match operation {
            SaveOperation::Noop => return,
            SaveOperation::Delete { attribution_id } => (Some(attribution_id), None),
            SaveOperation::Replace { from, to } => (Some(from), Some(to)),
            SaveOperation::Update { attribution_id } => (Some(attribution_id), Some(attribution_id)),
            SaveOperation::Link { attribution_id } | SaveOperation::Create { attribution_id } => {
                (None, Some(attribution_id))
            }
        };
        let affected = affected.cloned();
        let resulting = resulting.cloned();

        self.fix_panel_package(affected.as_ref(), resulting.as_ref());
        self.fix_selected_attribution(affected.as_ref(), resulting.as_ref());
    }

    fn fix_panel_package(&mut self, affected: Option<&AttributionId>, resulting: Option<&AttributionId>) {
        let linked = self.manual_attribution_ids_of_selected_resource();
        let shown = self
            .selected_panel_package
            .as_ref()
            .filter(|package| package.panel == PackagePanelTitle::ManualPackages)
            .and_then(PanelPackage::attribution_id);
        let stale = match shown {
            Some(id) => affected == Some(id) || !linked.contains(id),
            None => self.view == View::Audit && self.selected_panel_package.is_none(),
        };
        if !stale {
            return;
        }
        match resulting.filter(|id| linked.contains(id)) {
            Some(id) => self.select_manual_card(id, &linked),
            None => self.select_first_manual_attribution(),
        }
    }

    fn fix_selected_attribution(
        &mut self,
        affected: Option<&AttributionId>,
        resulting: Option<&AttributionId>,
    ) {
        let manual = self.resources.manual_data();
        let selected = self.selected_attribution_id.as_ref();
        let stale = selected.is_some_and(|id| affected == Some(id) || !manual.contains(id));
        let unset = selected.is_none() && self.view != View::Audit;
        if stale || unset {
            self.selected_attribution_id = resulting.filter(|id| manual.contains(id)).cloned();
        }
    }

    fn select_manual_card(&mut self, attribution_id: &AttributionId, linked: &[AttributionId]) {
        let index = linked
            .iter()
            .position(|id| id == attribution_id)
            .unwrap_or_default();
        self.selected_panel_package = self.resources.manual_data().get(attribution_id).map(|record| {
            PanelPackage::new(
                PackagePanelTitle::ManualPackages,
                index,
                DisplayPackageInfo::from(record),
            )
        });
    }

    fn notify_sink(&self) {
        if let Some(sink) = &self.sink {
            sink.save(&self.resources.save_file_args());
        }
    }
}
