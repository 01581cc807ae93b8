//! Value types of the navigation state.

use crate::aggregation::PackagePanelTitle;
use crate::model::{AttributionId, DisplayPackageInfo, ResourceId, SaveFileArgs};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Resource browser with panels
    #[default]
    Audit,
    /// List of all manual attributions
    Attribution,
    /// Tabular report
    Report,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Audit => "Audit",
            Self::Attribution => "Attribution",
            Self::Report => "Report",
        };
        f.write_str(name)
    }
}

/// Modal popups the guard can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopupType {
    /// Navigation attempted with unsaved edits
    NotSavedPopup,
    /// Save of a record that was preferred before
    ModifyWasPreferredAttributionPopup,
    /// Save attempted while saving is disabled
    UnableToSavePopup,
    /// A link could not be opened
    InvalidLinkPopup,
}

/// One entry of the popup stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupInfo {
    pub popup: PopupType,
    pub attribution_id: Option<AttributionId>,
}

/// Package card selected in the audit view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelPackage {
    pub panel: PackagePanelTitle,
    pub package_card_id: String,
    pub display_package_info: DisplayPackageInfo,
}

impl PanelPackage {
    #[must_use]
    pub fn new(
        panel: PackagePanelTitle,
        index: usize,
        display_package_info: DisplayPackageInfo,
    ) -> Self {
        Self {
            panel,
            package_card_id: package_card_id(panel, index),
            display_package_info,
        }
    }

    /// Id of the first record behind the card.
    #[must_use]
    pub fn attribution_id(&self) -> Option<&AttributionId> {
        self.display_package_info.attribution_ids.first()
    }
}

/// Stable id of a package card within its panel.
#[must_use]
pub fn package_card_id(panel: PackagePanelTitle, index: usize) -> String {
    let prefix = match panel {
        PackagePanelTitle::ManualPackages => "manual",
        PackagePanelTitle::ExternalPackages => "external",
        PackagePanelTitle::ContainedExternalPackages => "contained-external",
        PackagePanelTitle::ContainedManualPackages => "contained-manual",
    };
    format!("{prefix}-{index}")
}

/// Whether saving is currently permitted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AllowedSaveOperations {
    #[default]
    All,
    None,
}

impl AllowedSaveOperations {
    #[must_use]
    pub const fn allows_save(self) -> bool {
        matches!(self, Self::All)
    }
}

/// Where an edit applies when the record is shared by several resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveScope {
    /// Only the selected resource; shared records are split off
    #[default]
    SelectedResource,
    /// Every resource linked to the record
    Globally,
}

/// State of the unsaved-changes guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The edit buffer equals the record it shadows
    Clean,
    /// The edit buffer differs from the record it shadows
    Dirty,
    /// A navigation is waiting for the user to save, discard or cancel
    AwaitingConfirmation,
}

/// Destination of a navigation intent. Unset fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTarget {
    pub resource_id: Option<ResourceId>,
    pub attribution_id: Option<AttributionId>,
    pub view: Option<View>,
    pub panel_package: Option<PanelPackage>,
    pub open_file: bool,
}

impl NavigationTarget {
    #[must_use]
    pub fn resource(resource_id: impl Into<ResourceId>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attribution(attribution_id: impl Into<AttributionId>) -> Self {
        Self {
            attribution_id: Some(attribution_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn view(view: View) -> Self {
        Self {
            view: Some(view),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn panel_package(panel_package: PanelPackage) -> Self {
        Self {
            panel_package: Some(panel_package),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn open_file() -> Self {
        Self {
            open_file: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The store was updated (or the save was a no-op) and the sink notified
    Saved(crate::store::SaveOperation),
    /// Saving is disabled; an `UnableToSavePopup` was opened
    Denied,
    /// A confirmation popup was opened; nothing changed yet
    NeedsConfirmation,
}

impl SaveOutcome {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Receives the save payload after each persisted change.
///
/// Delivery is fire-and-forget: implementations handle their own failures.
pub trait SaveSink: Send {
    fn save(&self, args: &SaveFileArgs);
}

impl<F> SaveSink for F
where
    F: Fn(&SaveFileArgs) + Send,
{
    fn save(&self, args: &SaveFileArgs) {
        self(args);
    }
}
