use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::enrich::EnrichedMatch;
use crate::leaderboard_fetch::{DataSource, LeaderboardUpdate};
use crate::view_model::{LeaderboardView, SearchBox};

pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Only games of this kind are scored; everything else is a placeholder or a cancelled queue.
pub const COMPLETED_GAME_KIND: &str = "player_stats";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub mmr: f64,
    pub peak_mmr: f64,
    pub wins: u32,
    pub losses: u32,
    pub total_games: u32,
    // Fraction in [0, 1].
    pub winrate: f64,
    pub current_rank: Option<u32>,
    pub streak: i32,
}

impl PlayerStats {
    /// Ranked players ascending, then every unranked player, whatever the rank values.
    pub fn sort_key(&self) -> (bool, u32) {
        match self.current_rank {
            Some(rank) => (false, rank),
            None => (true, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: String,
    pub name: Option<String>,
    /// Alternate in-game name, searched alongside `name`.
    pub ign: Option<String>,
    pub avatar_url: Option<String>,
    pub color: Option<String>,
    pub stats: PlayerStats,
}

impl PlayerRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_PLAYER)
    }
}

/// Ranked view of the leaderboard at one point in time.
///
/// Players are kept sorted by `current_rank` ascending with unranked entries last, and ids are
/// unique. A refresh builds a new snapshot instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeaderboardSnapshot {
    players: Vec<PlayerRecord>,
    captured_at_ms: u64,
}

impl LeaderboardSnapshot {
    pub fn new(players: Vec<PlayerRecord>, captured_at_ms: u64) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut players: Vec<PlayerRecord> = players
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        // Stable, so equal ranks keep upstream order.
        players.sort_by_key(|p| p.stats.sort_key());
        Self {
            players,
            captured_at_ms,
        }
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn captured_at_ms(&self) -> u64 {
        self.captured_at_ms
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPlayer {
    pub id: String,
    pub name: Option<String>,
    pub pre_match_mmr: Option<f64>,
    /// Zero means the game had no rating effect for this player.
    pub mmr_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Monotonic queue counter; the feed is not guaranteed to be time ordered.
    pub game_number: u64,
    pub kind: String,
    pub time: Option<String>,
    pub teams: [Vec<MatchPlayer>; 2],
    pub team_names: [Option<String>; 2],
    pub winner_index: Option<usize>,
}

impl MatchRecord {
    pub fn is_completed_kind(&self) -> bool {
        self.kind == COMPLETED_GAME_KIND
    }

    pub fn has_rating_change(&self) -> bool {
        self.players().any(|p| p.mmr_change != 0.0)
    }

    pub fn is_candidate(&self) -> bool {
        self.is_completed_kind() && self.has_rating_change()
    }

    pub fn players(&self) -> impl Iterator<Item = &MatchPlayer> {
        self.teams.iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Leaderboard,
    Match,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardStatus {
    Idle,
    Updating,
    Updated { at: DateTime<Local> },
    UsingCache,
    FailedDemo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchPanel {
    Loading,
    Loaded(EnrichedMatch),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub board: LeaderboardView,
    pub board_status: LeaderboardStatus,
    pub board_source: Option<DataSource>,
    pub search: SearchBox,
    pub selected: usize,
    pub match_panel: MatchPanel,
    /// Last successfully selected match; kept in memory only.
    pub latest_match: Option<EnrichedMatch>,
    pub match_loaded_at: Option<DateTime<Local>>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Leaderboard,
            board: LeaderboardView::new(),
            board_status: LeaderboardStatus::Idle,
            board_source: None,
            search: SearchBox::new(),
            selected: 0,
            match_panel: MatchPanel::Loading,
            latest_match: None,
            match_loaded_at: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Leaderboard => Screen::Match,
            Screen::Match => Screen::Leaderboard,
        };
    }

    pub fn selected_player(&self) -> Option<&PlayerRecord> {
        self.board.visible_page().players.get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let total = self.board.visible_page().players.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.board.visible_page().players.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.board.visible_page().players.len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn next_page(&mut self) {
        if self.board.next_page() {
            self.selected = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.board.prev_page() {
            self.selected = 0;
        }
    }

    /// Applies a search term that has cleared the debounce window.
    pub fn apply_search(&mut self, term: &str) {
        self.board.set_search_term(term);
        self.selected = 0;
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    LeaderboardUpdating,
    SetLeaderboard(LeaderboardUpdate),
    MatchLoading,
    SetMatch(EnrichedMatch),
    MatchFailed(String),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    RefreshLeaderboard,
    RefreshMatch,
    LoadDemoMatch,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::LeaderboardUpdating => {
            state.board_status = LeaderboardStatus::Updating;
        }
        Delta::SetLeaderboard(update) => {
            let players = update.snapshot.len();
            state.board.apply_snapshot(update.snapshot);
            state.board_status = match update.source {
                DataSource::Live => LeaderboardStatus::Updated { at: Local::now() },
                DataSource::Cached => LeaderboardStatus::UsingCache,
                DataSource::Synthetic => LeaderboardStatus::FailedDemo,
            };
            state.board_source = Some(update.source);
            state.clamp_selection();
            match update.source {
                DataSource::Live => {
                    state.push_log(format!("[INFO] Leaderboard updated ({players} players)"))
                }
                DataSource::Cached => {
                    state.push_log("[WARN] Leaderboard fetch failed, using cache")
                }
                DataSource::Synthetic => {
                    state.push_log("[WARN] Leaderboard unavailable, showing demo data")
                }
            }
        }
        Delta::MatchLoading => {
            // Keep the current panel visible; only the status line changes.
            if state.latest_match.is_none() {
                state.match_panel = MatchPanel::Loading;
            }
            state.match_loaded_at = None;
        }
        Delta::SetMatch(enriched) => {
            state.push_log(format!("[INFO] Match #{} loaded", enriched.game_number));
            state.latest_match = Some(enriched.clone());
            state.match_panel = MatchPanel::Loaded(enriched);
            state.match_loaded_at = Some(Local::now());
        }
        Delta::MatchFailed(message) => {
            state.push_log(format!("[WARN] {message}"));
            state.match_panel = MatchPanel::Error(message);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn leaderboard_status_label(status: &LeaderboardStatus) -> String {
    match status {
        LeaderboardStatus::Idle => "Waiting for data".to_string(),
        LeaderboardStatus::Updating => "Updating...".to_string(),
        LeaderboardStatus::Updated { at } => format!("Last updated: {}", at.format("%H:%M")),
        LeaderboardStatus::UsingCache => "Using cached data".to_string(),
        LeaderboardStatus::FailedDemo => "Failed to load live data - showing demo data".to_string(),
    }
}

pub fn match_status_label(state: &AppState) -> String {
    match (&state.match_panel, state.match_loaded_at) {
        (MatchPanel::Error(_), _) => "Unable to load match".to_string(),
        (_, Some(at)) => format!("Match loaded: {}", at.format("%H:%M")),
        _ => "Loading match...".to_string(),
    }
}
