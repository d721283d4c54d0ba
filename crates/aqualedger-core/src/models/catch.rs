//! Catch record model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Assessment;
use crate::error::{Error, Result};

/// A unique identifier for a catch, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatchId(Uuid);

impl CatchId {
    /// Create a new unique catch ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CatchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Per-record sync lifecycle flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Stored locally, not yet committed remotely
    Pending,
    /// Remote ledger accepted every queued mutation for this record
    Synced,
    /// Last remote attempt failed; the queue still holds the payload
    Error,
}

impl SyncStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Synced, Self::Error];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "synced" => Ok(Self::Synced),
            "error" => Ok(Self::Error),
            other => Err(Error::InvalidInput(format!("unknown sync status '{other}'"))),
        }
    }
}

/// One logged fishing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchRecord {
    /// Unique identifier, assigned at insert time
    pub id: CatchId,
    /// Display name of the species (never empty)
    pub species: String,
    /// Weight in kilograms; `0` means unknown
    pub weight_kg: f64,
    /// Capture time (Unix ms), immutable after creation
    pub timestamp: i64,
    /// Sync lifecycle flag
    pub sync_status: SyncStatus,
    /// Sustainability score and rationale, replaced together
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    /// Optional evidentiary photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    /// Set by the remote ledger when the catch may breach local regulations
    #[serde(default)]
    pub compliance_warning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_details: Option<String>,
}

impl CatchRecord {
    /// Score, if the record has been evaluated
    #[must_use]
    pub fn score(&self) -> Option<u8> {
        self.assessment.as_ref().map(|assessment| assessment.score)
    }

    /// Rationale, if the record has been evaluated
    #[must_use]
    pub fn rationale(&self) -> Option<&str> {
        self.assessment
            .as_ref()
            .map(|assessment| assessment.rationale.as_str())
    }

    /// Whether the weight is the "unknown" sentinel
    #[must_use]
    pub fn has_unknown_weight(&self) -> bool {
        self.weight_kg == 0.0
    }
}

/// Input for a new catch; id, timestamp and status are assigned by the store
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCatch {
    pub species: String,
    pub weight_kg: f64,
    pub assessment: Option<Assessment>,
    pub image_base64: Option<String>,
}

impl NewCatch {
    #[must_use]
    pub fn new(species: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            species: species.into(),
            weight_kg,
            assessment: None,
            image_base64: None,
        }
    }

    #[must_use]
    pub fn with_assessment(mut self, assessment: Assessment) -> Self {
        self.assessment = Some(assessment);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image_base64 = Some(image_base64.into());
        self
    }

    /// Validate the draft and build the record the store will persist.
    pub fn into_record(self, id: CatchId, timestamp: i64) -> Result<CatchRecord> {
        Ok(CatchRecord {
            id,
            species: validate_species(&self.species)?,
            weight_kg: validate_weight(self.weight_kg)?,
            timestamp,
            sync_status: SyncStatus::Pending,
            assessment: self.assessment,
            image_base64: self.image_base64,
            compliance_warning: false,
            compliance_details: None,
        })
    }
}

/// Partial update merged into a stored record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatchPatch {
    pub species: Option<String>,
    pub weight_kg: Option<f64>,
    pub assessment: Option<Assessment>,
    /// `Some(None)` clears the photo
    pub image_base64: Option<Option<String>>,
}

impl CatchPatch {
    /// Check if the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.species.is_none()
            && self.weight_kg.is_none()
            && self.assessment.is_none()
            && self.image_base64.is_none()
    }

    /// Merge the patch into `record`, producing the full resulting record.
    ///
    /// The result is always `pending`: it now has an unsynced mutation.
    pub fn apply_to(&self, record: &CatchRecord) -> Result<CatchRecord> {
        let mut merged = record.clone();
        if let Some(species) = &self.species {
            merged.species = validate_species(species)?;
        }
        if let Some(weight_kg) = self.weight_kg {
            merged.weight_kg = validate_weight(weight_kg)?;
        }
        if let Some(assessment) = &self.assessment {
            merged.assessment = Some(assessment.clone());
        }
        if let Some(image) = &self.image_base64 {
            merged.image_base64.clone_from(image);
        }
        merged.sync_status = SyncStatus::Pending;
        Ok(merged)
    }
}

/// Trim a species name, rejecting empty values.
pub fn validate_species(species: &str) -> Result<String> {
    let trimmed = species.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput("species cannot be empty".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Accept finite, non-negative weights (`0` is the unknown sentinel).
pub fn validate_weight(weight_kg: f64) -> Result<f64> {
    if weight_kg.is_finite() && weight_kg >= 0.0 {
        Ok(weight_kg)
    } else {
        Err(Error::InvalidInput(format!(
            "weight must be a non-negative number of kilograms, got {weight_kg}"
        )))
    }
}
