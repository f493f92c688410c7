use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::cache_store::CacheStore;
use crate::config::Config;
use crate::demo_data;
use crate::enrich::enrich_match;
use crate::leaderboard_fetch;
use crate::match_fetch;
use crate::state::{Delta, ProviderCommand};

const POLL_SLEEP: Duration = Duration::from_millis(200);

/// Runs both refresh loops on one worker thread.
///
/// Each dataset refreshes on load, on its fixed interval and on demand. Failed runs retry at the
/// next tick with no backoff, and a newer result simply replaces an older one in the UI.
pub fn spawn_provider(
    config: Config,
    cache: CacheStore,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        let interval = config.refresh_interval;

        refresh_leaderboard(&config, &cache, &tx);
        let mut last_board = Instant::now();
        refresh_match(&config, &cache, &tx);
        let mut last_match = Instant::now();

        loop {
            thread::sleep(POLL_SLEEP);

            loop {
                match cmd_rx.try_recv() {
                    Ok(ProviderCommand::RefreshLeaderboard) => {
                        refresh_leaderboard(&config, &cache, &tx);
                        last_board = Instant::now();
                    }
                    Ok(ProviderCommand::RefreshMatch) => {
                        refresh_match(&config, &cache, &tx);
                        last_match = Instant::now();
                    }
                    Ok(ProviderCommand::LoadDemoMatch) => {
                        let leaderboard = cache.read_raw();
                        let enriched = enrich_match(demo_data::demo_match(), leaderboard.as_ref());
                        let _ = tx.send(Delta::SetMatch(enriched));
                        let _ = tx.send(Delta::Log("[INFO] Demo match loaded".to_string()));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if last_board.elapsed() >= interval {
                refresh_leaderboard(&config, &cache, &tx);
                last_board = Instant::now();
            }
            if last_match.elapsed() >= interval {
                refresh_match(&config, &cache, &tx);
                last_match = Instant::now();
            }
        }
    });
}

fn refresh_leaderboard(config: &Config, cache: &CacheStore, tx: &Sender<Delta>) {
    let _ = tx.send(Delta::LeaderboardUpdating);
    let update = leaderboard_fetch::refresh_leaderboard(config, cache);
    let _ = tx.send(Delta::SetLeaderboard(update));
}

fn refresh_match(config: &Config, cache: &CacheStore, tx: &Sender<Delta>) {
    let _ = tx.send(Delta::MatchLoading);
    match match_fetch::fetch_current_match(&config.matches_url) {
        Ok(record) => {
            // Joins against the persisted snapshot; staleness is fine for rank and avatar lookups.
            let leaderboard = cache.read_raw();
            let enriched = enrich_match(record, leaderboard.as_ref());
            let _ = tx.send(Delta::SetMatch(enriched));
        }
        Err(err) => {
            tracing::warn!(error = %err, "match refresh failed");
            let _ = tx.send(Delta::MatchFailed(err.user_message().to_string()));
        }
    }
}
