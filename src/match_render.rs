use chrono::{DateTime, NaiveDateTime, Utc};

use crate::enrich::{AvatarSource, EnrichedMatch, EnrichedPlayer, RankLabel};
use crate::leaderboard_render::{RankBadge, round_rating};
use crate::state::UNKNOWN_PLAYER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamOutcome {
    Victory,
    Defeat,
    /// The match has no recorded winner; neither side is marked.
    NoResult,
}

impl TeamOutcome {
    pub fn label(self) -> &'static str {
        match self {
            TeamOutcome::Victory => "VICTORY",
            TeamOutcome::Defeat => "DEFEAT",
            TeamOutcome::NoResult => "NO RESULT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlayerCard {
    pub name: String,
    pub pre_match_mmr: String,
    pub mmr_change: String,
    pub change_positive: bool,
    pub rank_label: String,
    pub badge: RankBadge,
    pub avatar_url: String,
    pub avatar_is_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamPanel {
    pub name: String,
    pub outcome: TeamOutcome,
    pub players: Vec<MatchPlayerCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchView {
    pub title: String,
    pub time_label: String,
    pub panels: [TeamPanel; 2],
}

pub fn render_match(m: &EnrichedMatch) -> MatchView {
    let panel = |idx: usize| {
        let outcome = match m.winner_index {
            Some(w) if w == idx => TeamOutcome::Victory,
            Some(_) => TeamOutcome::Defeat,
            None => TeamOutcome::NoResult,
        };
        let name = m.team_names[idx]
            .as_deref()
            .map(|raw| sanitize_name(raw).trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Team {}", idx + 1));
        TeamPanel {
            name,
            outcome,
            players: m.teams[idx].iter().map(player_card).collect(),
        }
    };
    MatchView {
        title: format!("Match #{}", m.game_number),
        time_label: format_match_time(m.time.as_deref()),
        panels: [panel(0), panel(1)],
    }
}

fn player_card(p: &EnrichedPlayer) -> MatchPlayerCard {
    let name = sanitize_name(p.player.name.as_deref().unwrap_or(UNKNOWN_PLAYER));
    let name = match name.trim() {
        "" => UNKNOWN_PLAYER.to_string(),
        trimmed => trimmed.to_string(),
    };
    let change = p.player.mmr_change;
    let badge = match p.rank {
        RankLabel::Ranked(rank) => RankBadge::for_rank(rank),
        RankLabel::NotAvailable => RankBadge::Default,
    };
    MatchPlayerCard {
        name,
        // A zero rating is how the feed marks an unknown one.
        pre_match_mmr: p
            .player
            .pre_match_mmr
            .filter(|mmr| *mmr != 0.0)
            .map(|mmr| round_rating(mmr).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        mmr_change: format_signed_change(change),
        change_positive: change >= 0.0,
        rank_label: format!("#{}", p.rank),
        badge,
        avatar_url: p.avatar.url().to_string(),
        avatar_is_placeholder: !matches!(p.avatar, AvatarSource::Leaderboard(_)),
    }
}

/// `+` for zero and above, one decimal place.
pub fn format_signed_change(change: f64) -> String {
    // Folds -0.0 into +0.0.
    let change = if change == 0.0 { 0.0 } else { change };
    if change >= 0.0 {
        format!("+{change:.1}")
    } else {
        format!("{change:.1}")
    }
}

/// Keeps ASCII word characters, whitespace and Cyrillic letters; drops everything else.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars().filter(|c| is_permitted_name_char(*c)).collect()
}

fn is_permitted_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c,
            '\u{0400}'..='\u{04FF}'
            | '\u{0500}'..='\u{052F}'
            | '\u{2DE0}'..='\u{2DFF}'
            | '\u{A640}'..='\u{A69F}')
}

/// Formats the feed's UTC time string, e.g. "Fri, Dec 5, 14:30 UTC".
pub fn format_match_time(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "Time not available".to_string();
    };
    match parse_match_time(raw) {
        Some(dt) => dt.format("%a, %b %-d, %H:%M UTC").to_string(),
        None => "Invalid time format".to_string(),
    }
}

fn parse_match_time(raw: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}
