use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    #[default]
    Full,
    ByTable,
    SchemaChanges,
}

impl BuildMode {
    /// Wire string expected by the vendor's `buildType` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::ByTable => "by_table",
            Self::SchemaChanges => "schema_changes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "by_table" => Some(Self::ByTable),
            "schema_changes" => Some(Self::SchemaChanges),
            _ => None,
        }
    }
}

/// One remote data model to build. Immutable, declared in the plan file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTarget {
    pub datamodel_id: String,
    #[serde(default)]
    pub mode: BuildMode,
    pub label: Option<String>,
}

impl BuildTarget {
    pub fn new(datamodel_id: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            datamodel_id: datamodel_id.into(),
            mode,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for logs and notifications, falling back to the raw id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.datamodel_id)
    }
}

/// Identifier returned by a successful trigger call.
///
/// Only meaningful within the run that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildHandle(String);

impl BuildHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BuildHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
