//! Page behaviors other than table sorting.
//!
//! Each behavior is a one-shot reaction to a page action. Deferred work is
//! returned to the caller as a [`TimerAction`] instead of being run here.

pub(crate) mod alerts;
pub(crate) mod clipboard;
pub(crate) mod csv_export;
pub(crate) mod dark_mode;
pub(crate) mod fade_in;
pub(crate) mod form_validation;
pub(crate) mod image_fallback;
pub(crate) mod notifications;
pub(crate) mod tooltips;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime_type: String,
    pub contents: String,
}

/// A form submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub form_id: Option<String>,
    pub entries: Vec<(String, String)>,
}

impl Submission {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Success,
    #[default]
    Info,
    Warning,
    Danger,
}

impl NotificationKind {
    /// Unknown names fall back to [`NotificationKind::Info`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "danger" | "error" => Self::Danger,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerAction {
    FadeOutAlert(NodeId),
    RemoveNode(NodeId),
    RestoreLabel(NodeId),
}

impl TimerAction {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::FadeOutAlert(_) => "fade-out-alert",
            Self::RemoveNode(_) => "remove-node",
            Self::RestoreLabel(_) => "restore-label",
        }
    }

    pub(crate) fn node(&self) -> NodeId {
        match self {
            Self::FadeOutAlert(node) | Self::RemoveNode(node) | Self::RestoreLabel(node) => *node,
        }
    }
}
