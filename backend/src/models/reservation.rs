//! Workstation reservations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::pc::PcId;

crate::define_id_type!(i64, ReservationId);

/// Booking lengths offered at the front desk, in hours.
pub const RESERVATION_HOURS: [u32; 6] = [1, 2, 3, 4, 6, 8];

/// Price of one reserved hour, in dollars.
pub const HOURLY_RATE: u32 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "activa" => Ok(Self::Active),
            "completed" | "completada" => Ok(Self::Completed),
            "cancelled" | "canceled" | "cancelada" => Ok(Self::Cancelled),
            other => Err(format!("Unknown reservation status: {}", other)),
        }
    }
}

/// A customer's booking of one PC for a block of hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReservationId>,
    pub user_id: String,
    pub pc_id: PcId,
    pub start_time: DateTime<Utc>,
    pub duration_hours: u32,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::hours(i64::from(self.duration_hours))
    }

    pub fn total_price(&self) -> u32 {
        self.duration_hours * HOURLY_RATE
    }

    /// Two active bookings of the same PC whose time ranges intersect.
    pub fn conflicts_with(&self, other: &Reservation) -> bool {
        self.status == ReservationStatus::Active
            && other.status == ReservationStatus::Active
            && self.pc_id == other.pc_id
            && self.start_time < other.end_time()
            && other.start_time < self.end_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking(pc: i64, hour: u32, hours: u32) -> Reservation {
        Reservation {
            id: None,
            user_id: "user-1".to_string(),
            pc_id: PcId::new(pc),
            start_time: Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap(),
            duration_hours: hours,
            status: ReservationStatus::Active,
        }
    }

    #[test]
    fn test_conflicts_only_on_same_pc_and_overlapping_time() {
        let evening = booking(3, 18, 2);
        assert!(evening.conflicts_with(&booking(3, 19, 1)));
        assert!(!evening.conflicts_with(&booking(3, 20, 1)), "back-to-back is fine");
        assert!(!evening.conflicts_with(&booking(4, 18, 2)));

        let cancelled = Reservation {
            status: ReservationStatus::Cancelled,
            ..booking(3, 18, 2)
        };
        assert!(!evening.conflicts_with(&cancelled));
    }

    #[test]
    fn test_price_and_end_time() {
        let r = booking(1, 22, 3);
        assert_eq!(r.total_price(), 15);
        assert_eq!(r.end_time(), Utc.with_ymd_and_hms(2025, 3, 15, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_status_vocabularies() {
        assert_eq!(
            "cancelada".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Cancelled
        );
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert!("pending".parse::<ReservationStatus>().is_err());
    }
}
