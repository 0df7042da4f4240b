//! Sample records and their create/update payloads

use crate::entity::{Entity, HasStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Backend-assigned sample identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(pub String);

impl SampleId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SampleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Sample lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    /// Registered, not yet picked up by the workflow
    Pending,
    /// Moving through workflow nodes
    InProgress,
    /// Held by a technician
    Paused,
    /// Flagged as abnormal
    Exception,
    /// Finished all nodes
    Completed,
    /// Withdrawn
    Cancelled,
}

impl SampleStatus {
    /// Wire name of the status
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Exception => "exception",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the status is final
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Default for SampleStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical form of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    /// Plasmid on an agar plate
    PlasmidPlate,
    /// Plasmid cell pellet
    PlasmidPellet,
    /// Plasmid liquid culture
    PlasmidLiquid,
    /// Extracted plasmid nucleic acid
    PlasmidNucleicAcid,
    /// Raw PCR product
    PcrProductOriginal,
    /// Purified PCR product
    PcrProductPurified,
}

/// A sample as mirrored from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Identity
    pub id: SampleId,
    /// Lab-facing code
    pub sample_code: String,
    /// Display name
    pub sample_name: String,
    /// Owning project
    pub project_id: String,
    /// Physical form
    pub sample_type: SampleType,
    /// Lifecycle status
    #[serde(default)]
    pub status: SampleStatus,
    /// Workflow node the sample currently sits in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_node: Option<String>,
    /// Container holding the sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Well label inside the container, e.g. "A01"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Sample this one was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sample_id: Option<SampleId>,
    /// Creator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time (server local time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Last update time (server local time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    /// Soft-delete marker
    #[serde(default)]
    pub deleted: bool,
}

impl Entity for Sample {
    type Id = SampleId;

    const KIND: &'static str = "sample";

    fn id(&self) -> &SampleId {
        &self.id
    }
}

impl HasStatus for Sample {
    type Status = SampleStatus;

    fn status(&self) -> &SampleStatus {
        &self.status
    }

    fn set_status(&mut self, status: SampleStatus) {
        self.status = status;
    }
}

/// Payload for creating one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDraft {
    /// Display name
    pub sample_name: String,
    /// Owning project
    pub project_id: String,
    /// Physical form
    pub sample_type: SampleType,
    /// Target container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Target well label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SampleDraft {
    /// Create new draft
    #[inline]
    #[must_use]
    pub fn new(
        sample_name: impl Into<String>,
        project_id: impl Into<String>,
        sample_type: SampleType,
    ) -> Self {
        Self {
            sample_name: sample_name.into(),
            project_id: project_id.into(),
            sample_type,
            container_id: None,
            position: None,
            description: None,
        }
    }

    /// Place the sample in a container well
    #[inline]
    #[must_use]
    pub fn in_well(mut self, container_id: impl Into<String>, position: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self.position = Some(position.into());
        self
    }
}

/// Partial update of one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePatch {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_name: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SampleStatus>,
    /// New container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// New well label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}
