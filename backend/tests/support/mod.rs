#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use cybercafe::models::{HourOfDay, UsageRecord};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Front-desk export with four good rows and one unparseable duration.
pub const SAMPLE_CSV: &str = "\
pcId,userId,duration,hour,day,timestamp
PC-01,user-1,60,14,3/14/2025,2025-03-14T14:05:00Z
PC-02,user-2,90,14,3/14/2025,2025-03-14T14:40:00Z
PC-03,user-3,30,9,3/14/2025,2025-03-14T09:10:00Z
PC-04,user-unknown,120,20,3/14/2025,2025-03-14T20:00:00Z
PC-05,user-5,??,21,3/14/2025,2025-03-14T21:00:00Z
";

/// Usage record on 2025-03-14 at `hour`.
pub fn record(pc: &str, user: &str, duration: i64, hour: u8) -> UsageRecord {
    UsageRecord::new(
        pc,
        user,
        duration,
        HourOfDay::new(hour).expect("hour in range"),
        Utc.with_ymd_and_hms(2025, 3, 14, hour as u32, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}

/// Runs `f` with environment variables temporarily modified.
///
/// Access is serialized across tests and the previous values are restored
/// even if `f` panics. `None` removes a variable.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = EnvRestore::apply(changes);
    f()
}

struct EnvRestore {
    previous: Vec<(String, Option<String>)>,
}

impl EnvRestore {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let previous = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (key, value) in changes {
            set_or_remove(key, *value);
        }

        Self { previous }
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            set_or_remove(&key, value.as_deref());
        }
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }
}
