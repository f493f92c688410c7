use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::cache_store::{CacheStore, now_ms};
use crate::config::Config;
use crate::demo_data;
use crate::http_client::fetch_json_text;
use crate::state::{LeaderboardSnapshot, PlayerRecord, PlayerStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    /// Network failed; cache was within the staleness window.
    Cached,
    /// Network and cache both unavailable.
    Synthetic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardUpdate {
    pub snapshot: LeaderboardSnapshot,
    pub source: DataSource,
}

pub fn refresh_leaderboard(config: &Config, cache: &CacheStore) -> LeaderboardUpdate {
    tracing::debug!(url = %config.leaderboard_url, "fetching leaderboard");
    let fetched = fetch_json_text(&config.leaderboard_url);
    resolve_leaderboard(fetched, cache, config.staleness_window(), now_ms())
}

/// Turns a fetch result into a snapshot: live data, then fresh cache, then demo data.
pub fn resolve_leaderboard(
    fetched: Result<String>,
    cache: &CacheStore,
    max_age: Duration,
    now_ms: u64,
) -> LeaderboardUpdate {
    match fetched.and_then(|body| parse_leaderboard_body(&body)) {
        Ok(root) => {
            let snapshot = snapshot_from_value(&root, now_ms);
            cache.write_at(&root, now_ms);
            tracing::info!(players = snapshot.len(), source = "live", "leaderboard refreshed");
            LeaderboardUpdate {
                snapshot,
                source: DataSource::Live,
            }
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "leaderboard fetch failed");
            if let Some(snapshot) = cache.read_if_fresh_at(max_age, now_ms) {
                tracing::info!(
                    players = snapshot.len(),
                    source = "cache",
                    "using cached leaderboard"
                );
                return LeaderboardUpdate {
                    snapshot,
                    source: DataSource::Cached,
                };
            }
            tracing::warn!(source = "synthetic", "no usable cache, loading demo leaderboard");
            LeaderboardUpdate {
                snapshot: demo_data::synthetic_leaderboard(now_ms),
                source: DataSource::Synthetic,
            }
        }
    }
}

pub fn parse_leaderboard_json(raw: &str, captured_at_ms: u64) -> Result<LeaderboardSnapshot> {
    let root = parse_leaderboard_body(raw)?;
    Ok(snapshot_from_value(&root, captured_at_ms))
}

/// Accepts any JSON object; anything else is malformed.
fn parse_leaderboard_body(raw: &str) -> Result<Value> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid leaderboard json")?;
    if !root.is_object() {
        bail!("leaderboard body is not an object");
    }
    Ok(root)
}

/// Builds a snapshot from a response body. A missing or non-array `alltime` yields no players.
pub fn snapshot_from_value(root: &Value, captured_at_ms: u64) -> LeaderboardSnapshot {
    let players = root
        .get("alltime")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().filter_map(parse_player).collect())
        .unwrap_or_default();
    LeaderboardSnapshot::new(players, captured_at_ms)
}

fn parse_player(row: &Value) -> Option<PlayerRecord> {
    let id = id_string(row.get("id")?)?;
    let data = row.get("data").unwrap_or(&Value::Null);

    let mmr = pick_f64(data, "mmr").unwrap_or(0.0);
    // Zero or missing values fall back the same way upstream treats falsy fields.
    let peak_mmr = pick_f64(data, "peak_mmr").filter(|v| *v != 0.0).unwrap_or(mmr);
    let wins = pick_u32(data, "wins").unwrap_or(0);
    let losses = pick_u32(data, "losses").unwrap_or(0);
    let total_games = pick_u32(data, "totalgames")
        .filter(|n| *n > 0)
        .unwrap_or(wins.saturating_add(losses));
    let winrate = pick_f64(data, "winrate")
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let current_rank = pick_u32(data, "current_rank").filter(|r| *r > 0);
    let streak = data
        .get("streak")
        .and_then(Value::as_i64)
        .map(|s| s.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        .unwrap_or(0);

    Some(PlayerRecord {
        id,
        name: pick_string(row, "name"),
        ign: pick_string(data, "ign"),
        avatar_url: pick_string(row, "avatar_url"),
        color: pick_string(row, "color"),
        stats: PlayerStats {
            mmr,
            peak_mmr,
            wins,
            losses,
            total_games,
            winrate,
            current_rank,
            streak,
        },
    })
}

/// Ids arrive as strings, but numeric ids are accepted too.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn pick_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn pick_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn pick_u32(value: &Value, key: &str) -> Option<u32> {
    let raw = value.get(key)?;
    if let Some(n) = raw.as_u64() {
        return u32::try_from(n).ok();
    }
    raw.as_f64()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
}
