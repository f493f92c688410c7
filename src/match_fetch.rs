use serde_json::Value;
use thiserror::Error;

use crate::http_client::fetch_json_text;
use crate::leaderboard_fetch::{id_string, pick_f64, pick_string};
use crate::state::{MatchPlayer, MatchRecord};

#[derive(Debug, Error)]
pub enum MatchFetchError {
    #[error("match history request failed: {0:#}")]
    Transport(anyhow::Error),
    /// Empty, missing or malformed `data` collection.
    #[error("match history payload had no matches")]
    NoMatches,
    #[error("no completed match with rating changes")]
    NoValidCandidate,
}

impl MatchFetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            MatchFetchError::Transport(_) => "Failed to load live match data.",
            MatchFetchError::NoMatches => "No recent matches found in the API response.",
            MatchFetchError::NoValidCandidate => {
                "Could not find a recent completed match in the data."
            }
        }
    }
}

pub fn fetch_current_match(url: &str) -> Result<MatchRecord, MatchFetchError> {
    tracing::debug!(url, "fetching match history");
    let body = fetch_json_text(url).map_err(MatchFetchError::Transport)?;
    current_match_from_json(&body)
}

pub fn current_match_from_json(raw: &str) -> Result<MatchRecord, MatchFetchError> {
    let matches = parse_history_json(raw)?;
    match select_current_match(&matches) {
        Some(found) => {
            tracing::info!(game_num = found.game_number, "selected current match");
            Ok(found.clone())
        }
        None => {
            tracing::warn!(fetched = matches.len(), "no candidate match in history");
            Err(MatchFetchError::NoValidCandidate)
        }
    }
}

pub fn parse_history_json(raw: &str) -> Result<Vec<MatchRecord>, MatchFetchError> {
    let root: Value =
        serde_json::from_str(raw.trim()).map_err(|_| MatchFetchError::NoMatches)?;
    let rows = root
        .get("data")
        .and_then(Value::as_array)
        .ok_or(MatchFetchError::NoMatches)?;
    let matches: Vec<MatchRecord> = rows.iter().filter_map(parse_match).collect();
    if matches.is_empty() {
        return Err(MatchFetchError::NoMatches);
    }
    Ok(matches)
}

/// Highest `game_number` among candidates. Ties keep the earliest entry in feed order.
pub fn select_current_match(matches: &[MatchRecord]) -> Option<&MatchRecord> {
    let mut best: Option<&MatchRecord> = None;
    for record in matches {
        if !record.is_candidate() {
            tracing::debug!(
                game_num = record.game_number,
                kind = %record.kind,
                "skipping non-candidate match"
            );
            continue;
        }
        let better = best
            .map(|current| record.game_number > current.game_number)
            .unwrap_or(true);
        if better {
            best = Some(record);
        }
    }
    best
}

fn parse_match(row: &Value) -> Option<MatchRecord> {
    if !row.is_object() {
        return None;
    }
    let game_number = row
        .get("game_num")
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
        .unwrap_or(0);
    let kind = pick_string(row, "game").unwrap_or_default();

    let teams_raw = row.get("teams").and_then(Value::as_array);
    let team = |idx: usize| -> Vec<MatchPlayer> {
        teams_raw
            .and_then(|teams| teams.get(idx))
            .and_then(Value::as_array)
            .map(|players| players.iter().filter_map(parse_match_player).collect())
            .unwrap_or_default()
    };

    let names_raw = row.get("team_names").and_then(Value::as_array);
    let team_name = |idx: usize| -> Option<String> {
        names_raw
            .and_then(|names| names.get(idx))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let winner_index = row
        .get("winner")
        .and_then(Value::as_u64)
        .filter(|w| *w <= 1)
        .map(|w| w as usize);

    Some(MatchRecord {
        game_number,
        kind,
        time: pick_string(row, "time"),
        teams: [team(0), team(1)],
        team_names: [team_name(0), team_name(1)],
        winner_index,
    })
}

fn parse_match_player(row: &Value) -> Option<MatchPlayer> {
    if !row.is_object() {
        return None;
    }
    Some(MatchPlayer {
        id: row.get("id").and_then(id_string).unwrap_or_default(),
        name: pick_string(row, "name"),
        pre_match_mmr: pick_f64(row, "mmr"),
        // Missing or null changes count as no rating effect.
        mmr_change: pick_f64(row, "mmr_change").unwrap_or(0.0),
    })
}
