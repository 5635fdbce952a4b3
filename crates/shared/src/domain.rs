use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::LayerNameError;

const WORKSPACE_SEPARATOR: char = ':';

/// Qualified layer identifier of the form `workspace:layer`.
///
/// Splits at the first separator; everything after it belongs to the bare
/// layer name. Neither half may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayerName {
    full: String,
    split_at: usize,
}

impl LayerName {
    pub fn parse(raw: &str) -> Result<Self, LayerNameError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LayerNameError::Empty);
        }
        let Some(split_at) = raw.find(WORKSPACE_SEPARATOR) else {
            return Err(LayerNameError::MissingWorkspace(raw.to_string()));
        };
        if split_at == 0 {
            return Err(LayerNameError::EmptyWorkspace(raw.to_string()));
        }
        if split_at + WORKSPACE_SEPARATOR.len_utf8() == raw.len() {
            return Err(LayerNameError::EmptyLayer(raw.to_string()));
        }
        Ok(Self {
            full: raw.to_string(),
            split_at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    pub fn workspace(&self) -> &str {
        &self.full[..self.split_at]
    }

    pub fn layer(&self) -> &str {
        &self.full[self.split_at + WORKSPACE_SEPARATOR.len_utf8()..]
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for LayerName {
    type Err = LayerNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LayerName {
    type Error = LayerNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LayerName> for String {
    fn from(value: LayerName) -> Self {
        value.full
    }
}

/// One addressable layer discovered from a capabilities document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub full_name: LayerName,
    pub workspace: String,
    pub name: String,
    pub title: String,
}

impl LayerRecord {
    pub fn new(full_name: LayerName, title: Option<&str>) -> Self {
        let title = match title.map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => full_name.to_string(),
        };
        Self {
            workspace: full_name.workspace().to_string(),
            name: full_name.layer().to_string(),
            full_name,
            title,
        }
    }

    /// Checkbox label text: the title, or the bare name when the title is blank.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSet(BTreeSet<String>);

impl WorkspaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, workspace: impl Into<String>) -> bool {
        self.0.insert(workspace.into())
    }

    pub fn contains(&self, workspace: &str) -> bool {
        self.0.contains(workspace)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Workspaces in presentation (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<'a> FromIterator<&'a LayerRecord> for WorkspaceSet {
    fn from_iter<T: IntoIterator<Item = &'a LayerRecord>>(iter: T) -> Self {
        Self(iter.into_iter().map(|record| record.workspace.clone()).collect())
    }
}
