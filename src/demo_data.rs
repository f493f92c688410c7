use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::{
    COMPLETED_GAME_KIND, LeaderboardSnapshot, MatchPlayer, MatchRecord, PlayerRecord, PlayerStats,
};

const DEMO_SEED: u64 = 0x5eed_1eade;

/// Deterministic stand-in leaderboard shown when neither the network nor the cache is usable.
pub fn synthetic_leaderboard(captured_at_ms: u64) -> LeaderboardSnapshot {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let mut players = vec![
        seed_player(
            "361506203907653633",
            "rocket",
            "https://cdn.discordapp.com/avatars/361506203907653633/8b508ad294a201287327238c9f932590.png",
            "#3498db",
            (1363.9987896571542, 1400.5),
            (20, 2, 11),
            1,
        ),
        seed_player(
            "462507304907653634",
            "killer_queen",
            "https://cdn.discordapp.com/avatars/462507304907653634/a1b2c3d4e5f6.png",
            "#e74c3c",
            (1320.5, 1350.0),
            (18, 4, 8),
            2,
        ),
        seed_player(
            "563608405907653635",
            "survivor_main",
            "https://cdn.discordapp.com/avatars/563608405907653635/g7h8i9j0k1l2.png",
            "#2ecc71",
            (1285.75, 1300.25),
            (16, 6, 5),
            3,
        ),
    ];

    for rank in 4..=25u32 {
        let wins = 25 - rank;
        let losses = rank;
        let total = wins + losses;
        let base_mmr = 1300.0 - f64::from(rank) * 15.0;
        players.push(PlayerRecord {
            id: format!("mock_player_{rank}"),
            name: Some(format!("Player{rank}")),
            ign: None,
            avatar_url: Some(format!(
                "https://cdn.discordapp.com/embed/avatars/{}.png",
                rank % 5
            )),
            color: Some(format!("#{:06x}", rng.gen_range(0..=0x00ff_ffffu32))),
            stats: PlayerStats {
                mmr: base_mmr,
                peak_mmr: base_mmr + rng.gen_range(0.0..50.0),
                wins,
                losses,
                total_games: total,
                winrate: f64::from(wins) / f64::from(total),
                current_rank: Some(rank),
                streak: rng.gen_range(0..10),
            },
        });
    }

    LeaderboardSnapshot::new(players, captured_at_ms)
}

fn seed_player(
    id: &str,
    name: &str,
    avatar_url: &str,
    color: &str,
    (mmr, peak_mmr): (f64, f64),
    (wins, losses, streak): (u32, u32, i32),
    rank: u32,
) -> PlayerRecord {
    let total = wins + losses;
    PlayerRecord {
        id: id.to_string(),
        name: Some(name.to_string()),
        ign: None,
        avatar_url: Some(avatar_url.to_string()),
        color: Some(color.to_string()),
        stats: PlayerStats {
            mmr,
            peak_mmr,
            wins,
            losses,
            total_games: total,
            winrate: f64::from(wins) / f64::from(total),
            current_rank: Some(rank),
            streak,
        },
    }
}

/// Sample completed match for offline use.
pub fn demo_match() -> MatchRecord {
    MatchRecord {
        game_number: 1128,
        kind: COMPLETED_GAME_KIND.to_string(),
        time: Some("2025-12-05 14:30:00".to_string()),
        teams: [
            vec![MatchPlayer {
                id: "361506203907653633".to_string(),
                name: Some("rocket".to_string()),
                pre_match_mmr: Some(1363.9987896571542),
                mmr_change: 28.27,
            }],
            vec![MatchPlayer {
                id: "462507304907653634".to_string(),
                name: Some("killer_queen".to_string()),
                pre_match_mmr: Some(1320.5),
                mmr_change: -39.77,
            }],
        ],
        team_names: [Some("rocket".to_string()), Some("killer_queen".to_string())],
        winner_index: Some(0),
    }
}
