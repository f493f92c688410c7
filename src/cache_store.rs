use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::leaderboard_fetch::snapshot_from_value;
use crate::state::LeaderboardSnapshot;

/// On-disk slot: the raw leaderboard response body and when it was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheSlot {
    data: Value,
    timestamp: u64,
}

/// Single persistent slot holding the last good leaderboard response.
///
/// Writes are best-effort and never surface errors. Reads treat missing or malformed data as
/// absent.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: Option<PathBuf>,
}

impl CacheStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A store with nowhere to persist; every read is absent.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn from_path(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn write(&self, body: &Value) {
        self.write_at(body, now_ms());
    }

    pub fn write_at(&self, body: &Value, timestamp_ms: u64) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let slot = CacheSlot {
            data: body.clone(),
            timestamp: timestamp_ms,
        };
        if let Err(err) = save_slot(path, &slot) {
            tracing::warn!(
                path = %path.display(),
                error = %format!("{err:#}"),
                "cache write failed"
            );
        }
    }

    pub fn read_if_fresh(&self, max_age: Duration) -> Option<LeaderboardSnapshot> {
        self.read_if_fresh_at(max_age, now_ms())
    }

    /// Returns the cached snapshot only when `now_ms - timestamp < max_age`.
    pub fn read_if_fresh_at(&self, max_age: Duration, now_ms: u64) -> Option<LeaderboardSnapshot> {
        let slot = self.load_slot()?;
        let age = now_ms.saturating_sub(slot.timestamp);
        if u128::from(age) >= max_age.as_millis() {
            return None;
        }
        Some(snapshot_from_value(&slot.data, slot.timestamp))
    }

    /// Returns the cached snapshot regardless of age.
    pub fn read_raw(&self) -> Option<LeaderboardSnapshot> {
        let slot = self.load_slot()?;
        Some(snapshot_from_value(&slot.data, slot.timestamp))
    }

    fn load_slot(&self) -> Option<CacheSlot> {
        let path = self.path.as_deref()?;
        let raw = fs::read_to_string(path).ok()?;
        let slot = serde_json::from_str::<CacheSlot>(&raw).ok()?;
        if !slot.data.is_object() {
            return None;
        }
        Some(slot)
    }
}

fn save_slot(path: &Path, slot: &CacheSlot) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(slot).context("serialize leaderboard cache")?;
    fs::write(&tmp, json).context("write leaderboard cache")?;
    fs::rename(&tmp, path).context("swap leaderboard cache")?;
    Ok(())
}

pub fn now_ms() -> u64 {
    system_time_to_ms(SystemTime::now()).unwrap_or_default()
}

fn system_time_to_ms(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
