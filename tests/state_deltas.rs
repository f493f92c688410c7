use ranked_board::demo_data::{demo_match, synthetic_leaderboard};
use ranked_board::enrich::{EnrichedMatch, enrich_match};
use ranked_board::leaderboard_fetch::{DataSource, LeaderboardUpdate};
use ranked_board::state::{
    AppState, Delta, LeaderboardSnapshot, LeaderboardStatus, MatchPanel, apply_delta,
    leaderboard_status_label, match_status_label,
};

fn board_update(source: DataSource) -> Delta {
    Delta::SetLeaderboard(LeaderboardUpdate {
        snapshot: synthetic_leaderboard(0),
        source,
    })
}

fn loaded_match() -> EnrichedMatch {
    enrich_match(demo_match(), None)
}

#[test]
fn updating_shows_progress_label() {
    let mut state = AppState::new();
    assert_eq!(leaderboard_status_label(&state.board_status), "Waiting for data");

    apply_delta(&mut state, Delta::LeaderboardUpdating);
    assert_eq!(state.board_status, LeaderboardStatus::Updating);
    assert_eq!(leaderboard_status_label(&state.board_status), "Updating...");
}

#[test]
fn live_data_reports_last_updated_time() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::LeaderboardUpdating);
    apply_delta(&mut state, board_update(DataSource::Live));

    assert!(matches!(state.board_status, LeaderboardStatus::Updated { .. }));
    assert!(leaderboard_status_label(&state.board_status).starts_with("Last updated: "));
    assert_eq!(state.board_source, Some(DataSource::Live));
    assert_eq!(state.board.full().len(), 25);
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[INFO]")));
}

#[test]
fn cached_data_reports_cache_use() {
    let mut state = AppState::new();
    apply_delta(&mut state, board_update(DataSource::Cached));

    assert_eq!(state.board_status, LeaderboardStatus::UsingCache);
    assert_eq!(leaderboard_status_label(&state.board_status), "Using cached data");
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[WARN]")));
}

#[test]
fn synthetic_data_reports_failure() {
    let mut state = AppState::new();
    apply_delta(&mut state, board_update(DataSource::Synthetic));

    assert_eq!(state.board_status, LeaderboardStatus::FailedDemo);
    assert_eq!(
        leaderboard_status_label(&state.board_status),
        "Failed to load live data - showing demo data"
    );
}

#[test]
fn smaller_leaderboard_clamps_selection() {
    let mut state = AppState::new();
    apply_delta(&mut state, board_update(DataSource::Live));
    state.selected = 19;

    let top_five = synthetic_leaderboard(0).players()[..5].to_vec();
    apply_delta(
        &mut state,
        Delta::SetLeaderboard(LeaderboardUpdate {
            snapshot: LeaderboardSnapshot::new(top_five, 1),
            source: DataSource::Live,
        }),
    );
    assert_eq!(state.selected, 4);
    assert_eq!(
        state.selected_player().map(|p| p.display_name()),
        Some("Player5")
    );
}

#[test]
fn match_loading_keeps_last_loaded_panel() {
    let mut state = AppState::new();
    assert_eq!(state.match_panel, MatchPanel::Loading);

    apply_delta(&mut state, Delta::SetMatch(loaded_match()));
    assert_eq!(state.match_panel, MatchPanel::Loaded(loaded_match()));
    assert!(match_status_label(&state).starts_with("Match loaded: "));

    apply_delta(&mut state, Delta::MatchLoading);
    assert_eq!(state.match_panel, MatchPanel::Loaded(loaded_match()));
    assert_eq!(match_status_label(&state), "Loading match...");
}

#[test]
fn first_match_load_shows_loading_panel() {
    let mut state = AppState::new();
    state.match_panel = MatchPanel::Error("old".to_string());

    apply_delta(&mut state, Delta::MatchLoading);
    assert_eq!(state.match_panel, MatchPanel::Loading);
}

#[test]
fn match_failure_replaces_panel_with_error() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetMatch(loaded_match()));

    let message = "Could not find a recent completed match in the data.";
    apply_delta(&mut state, Delta::MatchFailed(message.to_string()));

    assert_eq!(state.match_panel, MatchPanel::Error(message.to_string()));
    assert_eq!(match_status_label(&state), "Unable to load match");
    assert_eq!(state.latest_match, Some(loaded_match()));
    assert_eq!(state.logs.back().cloned(), Some(format!("[WARN] {message}")));
}
