use std::time::{Duration, Instant};

use crate::state::{LeaderboardSnapshot, PlayerRecord};

pub const PAGE_SIZE: usize = 20;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_secs(1);

/// Rows to render plus the offset used for positional ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct VisiblePage<'a> {
    pub players: Vec<&'a PlayerRecord>,
    pub rank_basis: usize,
}

/// Leaderboard state behind the table: the full snapshot, the searched subset and the page.
///
/// `filtered` holds indices into the snapshot, so it is always an order-preserving subsequence.
#[derive(Debug, Clone)]
pub struct LeaderboardView {
    full: LeaderboardSnapshot,
    filtered: Vec<usize>,
    current_page: usize,
    search_term: String,
}

impl Default for LeaderboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardView {
    pub fn new() -> Self {
        Self {
            full: LeaderboardSnapshot::default(),
            filtered: Vec::new(),
            current_page: 1,
            search_term: String::new(),
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: LeaderboardSnapshot) {
        self.full = snapshot;
        if self.search_term.is_empty() {
            self.filtered = (0..self.full.len()).collect();
            self.current_page = 1;
        } else {
            self.filtered = self.matching_indices();
        }
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.trim().to_lowercase();
        if self.search_term.is_empty() {
            self.filtered = (0..self.full.len()).collect();
            self.current_page = 1;
        } else {
            self.filtered = self.matching_indices();
        }
    }

    /// Moves to `page` when it is inside `1..=total_pages`; returns whether the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        if self.is_searching() || page < 1 || page > self.total_pages() {
            return false;
        }
        let changed = page != self.current_page;
        self.current_page = page;
        changed
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.set_page(self.current_page - 1)
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn pagination_visible(&self) -> bool {
        !self.is_searching()
    }

    pub fn full(&self) -> &LeaderboardSnapshot {
        &self.full
    }

    pub fn filtered(&self) -> Vec<&PlayerRecord> {
        self.filtered
            .iter()
            .filter_map(|idx| self.full.players().get(*idx))
            .collect()
    }

    /// While a search is active the whole filtered set is one batch ranked from 1.
    pub fn visible_page(&self) -> VisiblePage<'_> {
        let filtered = self.filtered();
        if self.is_searching() {
            return VisiblePage {
                players: filtered,
                rank_basis: 0,
            };
        }
        let start = (self.current_page - 1) * PAGE_SIZE;
        let players = filtered.into_iter().skip(start).take(PAGE_SIZE).collect();
        VisiblePage {
            players,
            rank_basis: start,
        }
    }

    pub fn page_indicator(&self) -> String {
        if self.is_searching() {
            return format!("Found {} player(s)", self.filtered.len());
        }
        let total = self.total_pages();
        if total == 0 {
            "No results".to_string()
        } else {
            format!("Page {} of {}", self.current_page, total)
        }
    }

    fn matching_indices(&self) -> Vec<usize> {
        self.full
            .players()
            .iter()
            .enumerate()
            .filter(|(_, p)| player_matches(p, &self.search_term))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// `term` must already be lowercased.
pub fn player_matches(player: &PlayerRecord, term: &str) -> bool {
    let hit = |field: &Option<String>| {
        field
            .as_deref()
            .map(|value| value.to_lowercase().contains(term))
            .unwrap_or(false)
    };
    hit(&player.name) || hit(&player.ign)
}

/// Window `[start, end)` of `visible` rows out of `total` that keeps `selected` on screen,
/// centred where possible.
pub fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSearch {
    term: String,
    deadline: Instant,
}

/// Cancellable delay: each input replaces the pending term and pushes the deadline out, so only
/// the last input within the window fires.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<PendingSearch>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some(PendingSearch {
            term: term.into(),
            deadline: now + self.delay,
        });
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .map(|p| now >= p.deadline)
            .unwrap_or(false);
        if !due {
            return None;
        }
        self.pending.take().map(|p| p.term)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Search input owned by the leaderboard screen.
#[derive(Debug, Clone)]
pub struct SearchBox {
    pub input: String,
    pub editing: bool,
    debouncer: SearchDebouncer,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            editing: false,
            debouncer: SearchDebouncer::new(SEARCH_DEBOUNCE),
        }
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.debouncer.input(self.input.clone(), now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.debouncer.input(self.input.clone(), now);
        }
    }

    /// Empties the input and drops any pending search.
    pub fn clear(&mut self) {
        self.input.clear();
        self.debouncer.cancel();
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        self.debouncer.poll(now)
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
