//! Storage-side data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UsageRecordId;
use crate::parsing::UploadFormat;

pub use crate::models::{Pc, PcId, PcStatus, UsageRecord};

/// Bookkeeping for one uploaded export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch {
    /// SHA-256 of the uploaded payload
    pub checksum: String,
    pub format: UploadFormat,
    pub record_ids: Vec<UsageRecordId>,
    pub imported_at: DateTime<Utc>,
}

/// Result of recording an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The records were stored under this new batch.
    Stored(ImportBatch),
    /// A batch with the same checksum already existed; nothing was stored.
    Duplicate(ImportBatch),
}

impl ImportOutcome {
    pub fn batch(&self) -> &ImportBatch {
        match self {
            ImportOutcome::Stored(batch) | ImportOutcome::Duplicate(batch) => batch,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, ImportOutcome::Duplicate(_))
    }
}
