use std::collections::HashSet;

use serde::Serialize;
use shared::domain::{LayerName, LayerRecord, WorkspaceSet};
use tracing::warn;

pub const NO_SELECTION_HEADING: &str = "Workspaces Available";
pub const NO_SELECTION_PROMPT: &str = "Please select a specific workspace to view its layers";
pub const EMPTY_WORKSPACE_MESSAGE: &str = "No layers found in this workspace";

/// Layers discovered from one server, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<LayerRecord>,
    workspaces: WorkspaceSet,
}

impl Catalog {
    /// Builds a catalog keeping the first record for each full name.
    pub fn from_records(records: impl IntoIterator<Item = LayerRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for record in records {
            if !seen.insert(record.full_name.clone()) {
                warn!(layer = %record.full_name, "duplicate layer in capabilities; keeping first");
                continue;
            }
            kept.push(record);
        }
        let workspaces = kept.iter().collect();
        Self {
            records: kept,
            workspaces,
        }
    }

    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    pub fn workspaces(&self) -> &WorkspaceSet {
        &self.workspaces
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &LayerName) -> Option<&LayerRecord> {
        self.records.iter().find(|record| &record.full_name == name)
    }

    pub fn contains(&self, name: &LayerName) -> bool {
        self.get(name).is_some()
    }

    pub fn select_workspace(&self, workspace: &str) -> LayerListing {
        if workspace.is_empty() {
            return LayerListing::NoSelection {
                workspaces: self.workspaces.to_sorted_vec(),
            };
        }
        LayerListing::Workspace {
            workspace: workspace.to_string(),
            layers: self
                .records
                .iter()
                .filter(|record| record.workspace == workspace)
                .cloned()
                .collect(),
        }
    }
}

/// What the layer list shows for the current workspace selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerListing {
    /// Nothing selected: informational list of workspaces, no toggles.
    NoSelection { workspaces: Vec<String> },
    Workspace {
        workspace: String,
        layers: Vec<LayerRecord>,
    },
}

impl LayerListing {
    pub fn heading(&self) -> String {
        match self {
            Self::NoSelection { .. } => NO_SELECTION_HEADING.to_string(),
            Self::Workspace { workspace, .. } => format!("Available Layers in {workspace}:"),
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NoSelection { .. } => Some(NO_SELECTION_PROMPT),
            Self::Workspace { layers, .. } if layers.is_empty() => Some(EMPTY_WORKSPACE_MESSAGE),
            Self::Workspace { .. } => None,
        }
    }

    /// Toggleable layers; always empty when no workspace is selected.
    pub fn layers(&self) -> &[LayerRecord] {
        match self {
            Self::NoSelection { .. } => &[],
            Self::Workspace { layers, .. } => layers,
        }
    }
}
