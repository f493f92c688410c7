use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ranked_board::demo_data::synthetic_leaderboard;
use ranked_board::enrich::enrich_match;
use ranked_board::leaderboard_fetch::parse_leaderboard_json;
use ranked_board::leaderboard_render::render_rows;
use ranked_board::match_fetch::current_match_from_json;
use ranked_board::match_render::render_match;
use ranked_board::state::{LeaderboardSnapshot, PlayerRecord};
use ranked_board::view_model::LeaderboardView;

/// Grows the demo roster into a board of `count` players with unique ids.
fn large_snapshot(count: usize) -> LeaderboardSnapshot {
    let base = synthetic_leaderboard(0);
    let players: Vec<PlayerRecord> = (0..count)
        .map(|idx| {
            let mut player = base.players()[idx % base.len()].clone();
            player.id = format!("bench_{idx}");
            player.name = Some(format!("{}_{idx}", player.display_name()));
            player.stats.current_rank = Some(idx as u32 + 1);
            player
        })
        .collect();
    LeaderboardSnapshot::new(players, 0)
}

fn bench_leaderboard_parse(c: &mut Criterion) {
    c.bench_function("leaderboard_parse", |b| {
        b.iter(|| {
            let snapshot = parse_leaderboard_json(black_box(LEADERBOARD_JSON), 0).unwrap();
            black_box(snapshot.len());
        })
    });
}

fn bench_search_filter(c: &mut Criterion) {
    let snapshot = large_snapshot(2_000);
    c.bench_function("search_filter", |b| {
        b.iter(|| {
            let mut view = LeaderboardView::new();
            view.apply_snapshot(snapshot.clone());
            view.set_search_term(black_box("player1"));
            black_box(view.filtered().len());
        })
    });
}

fn bench_render_page(c: &mut Criterion) {
    let mut view = LeaderboardView::new();
    view.apply_snapshot(large_snapshot(2_000));
    view.set_page(50);
    c.bench_function("render_page", |b| {
        b.iter(|| {
            let page = view.visible_page();
            let rows = render_rows(&page.players, page.rank_basis);
            black_box(rows.len());
        })
    });
}

fn bench_match_pipeline(c: &mut Criterion) {
    let board = parse_leaderboard_json(LEADERBOARD_JSON, 0).unwrap();
    c.bench_function("match_pipeline", |b| {
        b.iter(|| {
            let current = current_match_from_json(black_box(MATCH_HISTORY_JSON)).unwrap();
            let view = render_match(&enrich_match(current, Some(&board)));
            black_box(view.panels.len());
        })
    });
}

criterion_group!(
    perf,
    bench_leaderboard_parse,
    bench_search_filter,
    bench_render_page,
    bench_match_pipeline
);
criterion_main!(perf);

static LEADERBOARD_JSON: &str = include_str!("../tests/fixtures/leaderboard.json");
static MATCH_HISTORY_JSON: &str = include_str!("../tests/fixtures/match_history.json");
