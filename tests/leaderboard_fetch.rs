use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ranked_board::cache_store::CacheStore;
use ranked_board::leaderboard_fetch::{DataSource, parse_leaderboard_json, resolve_leaderboard};
use ranked_board::leaderboard_render::render_rows;
use ranked_board::state::{LeaderboardSnapshot, PlayerRecord, PlayerStats};
use ranked_board::view_model::LeaderboardView;

const WINDOW: Duration = Duration::from_secs(600);

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn temp_cache(name: &str) -> CacheStore {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let path = std::env::temp_dir()
        .join(format!("ranked_board_{name}_{}_{nanos}", std::process::id()))
        .join("leaderboard_cache.json");
    CacheStore::at(path)
}

fn player(id: &str, rank: Option<u32>) -> PlayerRecord {
    PlayerRecord {
        id: id.to_string(),
        name: Some(id.to_string()),
        ign: None,
        avatar_url: None,
        color: None,
        stats: PlayerStats {
            mmr: 1000.0,
            peak_mmr: 1000.0,
            wins: 1,
            losses: 1,
            total_games: 2,
            winrate: 0.5,
            current_rank: rank,
            streak: 0,
        },
    }
}

#[test]
fn parsed_snapshot_is_sorted_by_rank_with_unranked_last() {
    let raw = read_fixture("leaderboard.json");
    let snapshot = parse_leaderboard_json(&raw, 1_000).expect("fixture should parse");
    let ids: Vec<&str> = snapshot.players().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "100000000000000001",
            "200000000000000002",
            "300000000000000003",
            "400000000000000004",
            "900000000000000009",
        ]
    );
    assert_eq!(snapshot.players()[3].display_name(), "Unknown Player");
    assert_eq!(snapshot.players()[1].ign.as_deref(), Some("KQ Rocketeer"));
}

#[test]
fn row_order_ignores_input_order() {
    let forward = LeaderboardSnapshot::new(
        vec![player("a", Some(1)), player("b", None), player("c", Some(2))],
        0,
    );
    let reversed = LeaderboardSnapshot::new(
        vec![player("c", Some(2)), player("b", None), player("a", Some(1))],
        0,
    );
    let order = |s: &LeaderboardSnapshot| -> Vec<String> {
        s.players().iter().map(|p| p.id.clone()).collect()
    };
    assert_eq!(order(&forward), vec!["a", "c", "b"]);
    assert_eq!(order(&forward), order(&reversed));
}

#[test]
fn unranked_players_sort_after_large_ranks() {
    let raw = r#"{"alltime":[
        {"id":"u","name":"unranked","data":{"mmr":900}},
        {"id":"r1000","name":"deep","data":{"mmr":950,"current_rank":1000}},
        {"id":"r1","name":"top","data":{"mmr":1500,"current_rank":1}},
        {"id":"r5000","name":"deeper","data":{"mmr":800,"current_rank":5000}}
    ]}"#;
    let snapshot = parse_leaderboard_json(raw, 0).expect("valid json");
    let ids: Vec<&str> = snapshot.players().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r1000", "r5000", "u"]);
}

#[test]
fn duplicate_ids_keep_first_record() {
    let snapshot = LeaderboardSnapshot::new(vec![player("a", Some(2)), player("a", Some(1))], 0);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.players()[0].stats.current_rank, Some(2));
}

#[test]
fn missing_alltime_is_an_empty_live_snapshot() {
    let cache = temp_cache("missing_alltime");
    let update = resolve_leaderboard(Ok(r#"{"weekly":[]}"#.to_string()), &cache, WINDOW, 5_000);
    assert_eq!(update.source, DataSource::Live);
    assert!(update.snapshot.is_empty());
}

#[test]
fn live_fetch_writes_cache_and_failure_reads_it_back() {
    let cache = temp_cache("live_then_cache");
    let raw = read_fixture("leaderboard.json");

    let live = resolve_leaderboard(Ok(raw), &cache, WINDOW, 10_000);
    assert_eq!(live.source, DataSource::Live);
    assert_eq!(live.snapshot.len(), 5);

    let fallback = resolve_leaderboard(
        Err(anyhow::anyhow!("http 503")),
        &cache,
        WINDOW,
        10_000 + 60_000,
    );
    assert_eq!(fallback.source, DataSource::Cached);
    let ids = |u: &ranked_board::leaderboard_fetch::LeaderboardUpdate| -> Vec<String> {
        u.snapshot.players().iter().map(|p| p.id.clone()).collect()
    };
    assert_eq!(ids(&fallback), ids(&live));
    assert_eq!(fallback.snapshot.captured_at_ms(), 10_000);
}

#[test]
fn malformed_body_falls_back_like_transport_failure() {
    let cache = temp_cache("malformed");
    resolve_leaderboard(Ok(read_fixture("leaderboard.json")), &cache, WINDOW, 0);
    let update = resolve_leaderboard(Ok("<html>bad gateway</html>".to_string()), &cache, WINDOW, 1);
    assert_eq!(update.source, DataSource::Cached);
}

#[test]
fn stale_cache_falls_through_to_synthetic_data() {
    let cache = temp_cache("stale");
    resolve_leaderboard(Ok(read_fixture("leaderboard.json")), &cache, WINDOW, 0);

    let window_ms = WINDOW.as_millis() as u64;
    let update = resolve_leaderboard(Err(anyhow::anyhow!("offline")), &cache, WINDOW, window_ms);
    assert_eq!(update.source, DataSource::Synthetic);
    assert_eq!(update.snapshot.players()[0].display_name(), "rocket");
    assert_eq!(update.snapshot.len(), 25);
}

#[test]
fn no_cache_gives_synthetic_data() {
    let update = resolve_leaderboard(
        Err(anyhow::anyhow!("offline")),
        &CacheStore::disabled(),
        WINDOW,
        0,
    );
    assert_eq!(update.source, DataSource::Synthetic);
    assert!(!update.snapshot.is_empty());
}

#[test]
fn refreshing_twice_renders_identical_rows() {
    let raw = read_fixture("leaderboard.json");
    let cache = temp_cache("idempotent");

    let render = |update_body: String, now: u64| {
        let update = resolve_leaderboard(Ok(update_body), &cache, WINDOW, now);
        let mut view = LeaderboardView::new();
        view.apply_snapshot(update.snapshot);
        let page = view.visible_page();
        render_rows(&page.players, page.rank_basis)
    };

    let first = render(raw.clone(), 1_000);
    let second = render(raw, 2_000);
    assert_eq!(first, second);
}
