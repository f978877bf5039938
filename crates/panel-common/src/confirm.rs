//! Confirmation wording for instance actions.
//!
//! Callers look up the copy here instead of inlining strings, so every prompt
//! for the same action reads the same. Both lookups are total: unknown action
//! identifiers get a generic title and message.

use std::fmt;
use std::str::FromStr;

const FALLBACK_TITLE: &str = "Confirm Action";
const FALLBACK_MESSAGE: &str = "Do you want to continue with this action?";

/// Instance actions that require confirmation before they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceAction {
    Restart,
    UpdateDb,
    UpdateFiles,
    SyncFilestore,
    RegenerateAssets,
    Delete,
}

impl InstanceAction {
    pub const ALL: [InstanceAction; 6] = [
        Self::Restart,
        Self::UpdateDb,
        Self::UpdateFiles,
        Self::SyncFilestore,
        Self::RegenerateAssets,
        Self::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restart => "restart",
            Self::UpdateDb => "update-db",
            Self::UpdateFiles => "update-files",
            Self::SyncFilestore => "sync-filestore",
            Self::RegenerateAssets => "regenerate-assets",
            Self::Delete => "delete",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Restart => "Restart Instance",
            Self::UpdateDb => "Update Database",
            Self::UpdateFiles => "Update Files",
            Self::SyncFilestore => "Sync Filestore",
            Self::RegenerateAssets => "Regenerate Assets",
            Self::Delete => "Delete Instance",
        }
    }

    pub fn message(&self, instance_name: &str) -> String {
        match self {
            Self::Restart => format!(
                "Restart instance {}? The service will stop briefly.",
                instance_name
            ),
            Self::UpdateDb => format!(
                "Update the database of {} from production? This can take several minutes.",
                instance_name
            ),
            Self::UpdateFiles => format!("Update the files of {} from production?", instance_name),
            Self::SyncFilestore => format!(
                "Sync the filestore (images and attachments) of {} from production? All assets will be copied.",
                instance_name
            ),
            Self::RegenerateAssets => format!(
                "Regenerate the assets (CSS, JS, icons) of {}? The service will stop briefly.",
                instance_name
            ),
            Self::Delete => format!(
                "Are you sure you want to delete instance {}? This cannot be undone and all data will be lost.",
                instance_name
            ),
        }
    }

    /// Actions that destroy data and deserve a second, typed confirmation.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("Unknown instance action: {}", s))
    }
}

pub fn confirm_title(action: &str) -> &'static str {
    action
        .parse::<InstanceAction>()
        .map(|a| a.title())
        .unwrap_or(FALLBACK_TITLE)
}

pub fn confirm_message(action: &str, instance_name: &str) -> String {
    action
        .parse::<InstanceAction>()
        .map(|a| a.message(instance_name))
        .unwrap_or_else(|_| FALLBACK_MESSAGE.to_string())
}
