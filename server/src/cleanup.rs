use std::time::Instant;

use tokio::time;
use tracing::{debug, info};

use crate::{
    config::ServerConfig,
    logic::Games,
    rate_limit::{RateLimiter, prune_rate_limiter},
};

pub async fn start_cleanup_task(games: Games, rate_limiter: RateLimiter, config: ServerConfig) {
    let mut interval = time::interval(config.cleanup_interval);

    info!(
        "Started game cleanup task: checking every {}s, inactive timeout: {}s, active timeout: {}s",
        config.cleanup_interval.as_secs(),
        config.inactive_timeout_secs,
        config.active_timeout_secs
    );

    loop {
        interval.tick().await;
        cleanup_games(
            &games,
            config.inactive_timeout_secs,
            config.active_timeout_secs,
        );
        prune_rate_limiter(&rate_limiter, Instant::now());
    }
}

pub fn cleanup_games(games: &Games, inactive_timeout_secs: u64, active_timeout_secs: u64) -> usize {
    let mut games_to_remove = Vec::new();

    for entry in games.iter() {
        // A game locked right now is in use, leave it for the next pass.
        if let Ok(game) = entry.value().try_lock()
            && game.should_cleanup(inactive_timeout_secs, active_timeout_secs)
        {
            games_to_remove.push(entry.key().clone());
        }
    }

    let removed_count = games_to_remove.len();
    for game_id in games_to_remove {
        games.remove(&game_id);
        debug!("Cleaned up game: {}", game_id);
    }

    if removed_count > 0 {
        info!("Cleaned up {} inactive games", removed_count);
    }
    removed_count
}
