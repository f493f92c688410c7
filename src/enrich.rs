use std::fmt;

use crate::state::{LeaderboardSnapshot, MatchPlayer, MatchRecord, PlayerRecord};

pub const DEFAULT_AVATAR: &str = "images/default-avatar.png";
const PLACEHOLDER_AVATAR_COUNT: u64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankLabel {
    Ranked(u32),
    NotAvailable,
}

impl fmt::Display for RankLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankLabel::Ranked(rank) => write!(f, "{rank}"),
            RankLabel::NotAvailable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource {
    Leaderboard(String),
    Placeholder(String),
    Default,
}

impl AvatarSource {
    pub fn url(&self) -> &str {
        match self {
            AvatarSource::Leaderboard(url) | AvatarSource::Placeholder(url) => url,
            AvatarSource::Default => DEFAULT_AVATAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPlayer {
    pub player: MatchPlayer,
    pub rank: RankLabel,
    pub avatar: AvatarSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMatch {
    pub game_number: u64,
    pub time: Option<String>,
    pub team_names: [Option<String>; 2],
    pub winner_index: Option<usize>,
    pub teams: [Vec<EnrichedPlayer>; 2],
}

/// Joins match players against a leaderboard snapshot by id.
///
/// A player missing from the snapshot is normal (new or removed players) and resolves through
/// the placeholder chain. The snapshot may be stale; only rank and avatar are read from it.
pub fn enrich_match(
    record: MatchRecord,
    leaderboard: Option<&LeaderboardSnapshot>,
) -> EnrichedMatch {
    let MatchRecord {
        game_number,
        time,
        teams,
        team_names,
        winner_index,
        ..
    } = record;
    let teams: [Vec<EnrichedPlayer>; 2] = teams.map(|team| {
        team.into_iter()
            .map(|player| enrich_player(player, leaderboard))
            .collect()
    });
    EnrichedMatch {
        game_number,
        time,
        team_names,
        winner_index,
        teams,
    }
}

fn enrich_player(player: MatchPlayer, leaderboard: Option<&LeaderboardSnapshot>) -> EnrichedPlayer {
    let found = leaderboard.and_then(|board| board.find(&player.id));
    let rank = found
        .and_then(|p| p.stats.current_rank)
        .map(RankLabel::Ranked)
        .unwrap_or(RankLabel::NotAvailable);
    let avatar = resolve_avatar(&player.id, found);
    EnrichedPlayer {
        player,
        rank,
        avatar,
    }
}

pub fn resolve_avatar(id: &str, found: Option<&PlayerRecord>) -> AvatarSource {
    if let Some(url) = found.and_then(|p| p.avatar_url.as_ref()) {
        return AvatarSource::Leaderboard(url.clone());
    }
    if id.is_empty() {
        return AvatarSource::Default;
    }
    AvatarSource::Placeholder(placeholder_avatar_url(id))
}

pub fn placeholder_avatar_url(id: &str) -> String {
    let index = fnv1a(id.as_bytes()) % PLACEHOLDER_AVATAR_COUNT;
    format!("https://cdn.discordapp.com/embed/avatars/{index}.png")
}

// Stable across builds and platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(PRIME)
    })
}
