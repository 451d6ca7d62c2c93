//! Usage-session domain types.
//!
//! A [`UsageRecord`] is one observed workstation session. The aggregation
//! outputs ([`HourlyPrediction`], [`TrainingResult`]) are computed fresh from a
//! batch of records and never stored.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, UsageRecordId);

/// Sentinel user identifier assigned by ingestion when a session has no owner.
pub const UNKNOWN_USER: &str = "user-unknown";

/// Shortest session, in minutes, considered a real use of a workstation.
pub const MIN_VALID_DURATION_MINUTES: i64 = 15;

/// Longest session, in minutes, considered a real use of a workstation.
pub const MAX_VALID_DURATION_MINUTES: i64 = 240;

/// Number of hourly buckets in a day.
pub const HOURS_PER_DAY: usize = 24;

/// Hour of the day in `[0, 23]`.
///
/// Construction through [`HourOfDay::new`] or `TryFrom<u8>` is the only way to
/// obtain a value, so every hour that reaches the aggregator indexes a bucket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HourOfDay(u8);

impl HourOfDay {
    pub fn new(hour: u8) -> Option<Self> {
        if (hour as usize) < HOURS_PER_DAY {
            Some(Self(hour))
        } else {
            None
        }
    }

    /// Hour of the day at which `timestamp` falls, in UTC.
    pub fn of_timestamp(timestamp: &DateTime<Utc>) -> Self {
        Self((timestamp.hour() % HOURS_PER_DAY as u32) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for HourOfDay {
    type Error = String;

    fn try_from(hour: u8) -> Result<Self, Self::Error> {
        Self::new(hour).ok_or_else(|| format!("hour {} is outside 0..=23", hour))
    }
}

impl From<HourOfDay> for u8 {
    fn from(hour: HourOfDay) -> Self {
        hour.0
    }
}

impl fmt::Display for HourOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

/// One observed workstation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Repository-assigned id; `None` until stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UsageRecordId>,
    pub pc_id: String,
    pub user_id: String,
    #[serde(rename = "duration")]
    pub duration_minutes: i64,
    pub hour: HourOfDay,
    /// Day label as exported by the front desk (e.g. `"3/14/2025"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(
        pc_id: impl Into<String>,
        user_id: impl Into<String>,
        duration_minutes: i64,
        hour: HourOfDay,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            pc_id: pc_id.into(),
            user_id: user_id.into(),
            duration_minutes,
            hour,
            day: None,
            timestamp,
        }
    }

    pub fn has_valid_duration(&self) -> bool {
        (MIN_VALID_DURATION_MINUTES..=MAX_VALID_DURATION_MINUTES).contains(&self.duration_minutes)
    }

    pub fn has_pc(&self) -> bool {
        !self.pc_id.is_empty()
    }

    pub fn has_known_user(&self) -> bool {
        !self.user_id.is_empty() && self.user_id != UNKNOWN_USER
    }

    /// A record is valid when its duration lies in `[15, 240]` minutes, it
    /// names a workstation and it belongs to a known user.
    pub fn is_valid(&self) -> bool {
        self.has_valid_duration() && self.has_pc() && self.has_known_user()
    }
}

/// Average session duration for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPrediction {
    pub hour: u8,
    pub average_duration_minutes: i64,
}

/// Summary produced by the demand aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    /// Coefficient of determination of the hourly-mean model, in `[0, 1]`.
    pub accuracy_score: f64,
    /// Exactly 24 entries ordered by hour.
    pub predictions: Vec<HourlyPrediction>,
    pub peak_hours: BTreeSet<u8>,
    pub average_duration_overall: i64,
}
