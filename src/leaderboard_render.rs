use crate::state::{LeaderboardSnapshot, PlayerRecord};

pub const DEFAULT_STREAK_COLOR: &str = "#e74c3c";
pub const EMPTY_TABLE_MESSAGE: &str = "No players found";
const FEATURE_CARD_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBadge {
    First,
    Second,
    Third,
    TopTen,
    Default,
}

impl RankBadge {
    pub fn for_rank(rank: u32) -> Self {
        match rank {
            1 => RankBadge::First,
            2 => RankBadge::Second,
            3 => RankBadge::Third,
            4..=10 => RankBadge::TopTen,
            _ => RankBadge::Default,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            RankBadge::First => "rank-1",
            RankBadge::Second => "rank-2",
            RankBadge::Third => "rank-3",
            RankBadge::TopTen => "rank-top10",
            RankBadge::Default => "rank-other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakCell {
    /// Win streak, drawn with an icon in the player's accent colour.
    Positive { value: i32, color: String },
    Negative(i32),
    Zero,
}

impl StreakCell {
    pub fn from_player(player: &PlayerRecord) -> Self {
        let streak = player.stats.streak;
        if streak > 0 {
            StreakCell::Positive {
                value: streak,
                color: player
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STREAK_COLOR.to_string()),
            }
        } else if streak < 0 {
            StreakCell::Negative(streak)
        } else {
            StreakCell::Zero
        }
    }

    pub fn text(&self) -> String {
        match self {
            StreakCell::Positive { value, .. } => format!("🔥 {value}"),
            StreakCell::Negative(value) => value.to_string(),
            StreakCell::Zero => "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub player_id: String,
    pub rank: u32,
    pub badge: RankBadge,
    pub name: String,
    pub avatar_url: Option<String>,
    pub mmr: i64,
    pub peak_mmr: i64,
    pub wins: u32,
    pub losses: u32,
    pub total_games: u32,
    pub winrate: String,
    pub streak: StreakCell,
    /// Query string used to open the player's profile.
    pub profile_query: String,
}

impl PlayerRow {
    pub fn record_text(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Player(PlayerRow),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCard {
    pub position: usize,
    pub name: String,
    pub avatar_url: Option<String>,
    pub rank: u32,
    pub mmr: i64,
    pub peak_mmr: i64,
    pub record: String,
    pub winrate: String,
    pub streak_label: String,
}

/// Builds table rows for one page. `rank_basis` is the zero-based position of the first row and
/// supplies the displayed rank for players without one.
pub fn render_rows(page: &[&PlayerRecord], rank_basis: usize) -> Vec<TableRow> {
    if page.is_empty() {
        return vec![TableRow::Empty];
    }
    page.iter()
        .enumerate()
        .map(|(idx, player)| TableRow::Player(player_row(player, rank_basis + idx + 1)))
        .collect()
}

pub fn player_row(player: &PlayerRecord, positional_rank: usize) -> PlayerRow {
    let stats = &player.stats;
    let rank = stats
        .current_rank
        .unwrap_or_else(|| u32::try_from(positional_rank).unwrap_or(u32::MAX));
    PlayerRow {
        player_id: player.id.clone(),
        rank,
        badge: RankBadge::for_rank(rank),
        name: player.display_name().to_string(),
        avatar_url: player.avatar_url.clone(),
        mmr: round_rating(stats.mmr),
        peak_mmr: round_rating(stats.peak_mmr),
        wins: stats.wins,
        losses: stats.losses,
        total_games: stats.total_games,
        winrate: format_winrate(stats.winrate),
        streak: StreakCell::from_player(player),
        profile_query: format!("?player={}", player.id),
    }
}

/// First three players of the full snapshot, independent of search and paging.
pub fn feature_cards(snapshot: &LeaderboardSnapshot) -> Vec<FeatureCard> {
    snapshot
        .players()
        .iter()
        .take(FEATURE_CARD_COUNT)
        .enumerate()
        .map(|(idx, player)| {
            let stats = &player.stats;
            FeatureCard {
                position: idx + 1,
                name: player.display_name().to_string(),
                avatar_url: player.avatar_url.clone(),
                rank: stats.current_rank.unwrap_or(idx as u32 + 1),
                mmr: round_rating(stats.mmr),
                peak_mmr: round_rating(stats.peak_mmr),
                record: format!("{}-{}", stats.wins, stats.losses),
                winrate: format_winrate(stats.winrate),
                streak_label: format!("{} games", stats.streak),
            }
        })
        .collect()
}

pub fn format_winrate(winrate: f64) -> String {
    format!("{:.1}%", winrate * 100.0)
}

pub fn round_rating(value: f64) -> i64 {
    value.round() as i64
}
