//! Live workstation sessions.
//!
//! A [`Session`] is opened when a customer sits down at a PC and closed by
//! the front desk. Closing it yields the [`UsageRecord`] the demand
//! aggregator learns from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pc::PcId;
use super::usage::{HourOfDay, UsageRecord};

crate::define_id_type!(i64, SessionId);

/// Lifecycle state of a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "activa" => Ok(Self::Active),
            "ended" | "finalizada" => Ok(Self::Ended),
            other => Err(format!("Unknown session status: {}", other)),
        }
    }
}

/// A customer's use of one workstation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SessionId>,
    pub user_id: String,
    pub pc_id: PcId,
    /// Desk number of the PC, copied when the session starts.
    pub pc_number: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

impl Session {
    /// A new active session; the repository fills in the PC number and id.
    pub fn start(user_id: impl Into<String>, pc_id: PcId, started_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            pc_id,
            pc_number: 0,
            started_at,
            ended_at: None,
            status: SessionStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whole minutes between the start and `now`, never negative.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_minutes().max(0)
    }

    /// The usage record describing this session once it ends at `ended_at`.
    pub fn to_usage_record(&self, ended_at: DateTime<Utc>) -> UsageRecord {
        let mut record = UsageRecord::new(
            format!("PC-{}", self.pc_number),
            self.user_id.clone(),
            self.elapsed_minutes(ended_at),
            HourOfDay::of_timestamp(&self.started_at),
            self.started_at,
        );
        record.day = Some(self.started_at.format("%-m/%-d/%Y").to_string());
        record
    }
}

/// Outcome of closing a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndedSession {
    pub session: Session,
    /// The stored record produced from the session.
    pub usage_record: UsageRecord,
}
