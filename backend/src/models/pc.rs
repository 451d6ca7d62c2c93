//! Workstation registry types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, PcId);

/// Availability of a workstation on the floor map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcStatus {
    Free,
    Occupied,
    Maintenance,
}

impl PcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PcStatus::Free => "free",
            PcStatus::Occupied => "occupied",
            PcStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for PcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PcStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" | "libre" => Ok(Self::Free),
            "occupied" | "ocupada" => Ok(Self::Occupied),
            "maintenance" | "mantenimiento" => Ok(Self::Maintenance),
            other => Err(format!("Unknown PC status: {}", other)),
        }
    }
}

/// A workstation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PcId>,
    /// Number painted on the desk, unique within the cafe.
    pub number: u32,
    pub status: PcStatus,
    pub location: String,
    #[serde(default)]
    pub specs: String,
}

/// Counts of workstations per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcStatusSummary {
    pub total: usize,
    pub free: usize,
    pub occupied: usize,
    pub maintenance: usize,
}

impl PcStatusSummary {
    pub fn from_pcs(pcs: &[Pc]) -> Self {
        pcs.iter().fold(Self::default(), |mut summary, pc| {
            summary.total += 1;
            match pc.status {
                PcStatus::Free => summary.free += 1,
                PcStatus::Occupied => summary.occupied += 1,
                PcStatus::Maintenance => summary.maintenance += 1,
            }
            summary
        })
    }
}
