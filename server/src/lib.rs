pub mod cleanup;
pub mod config;
pub mod cors;
pub mod logic;
pub mod rate_limit;
pub mod routes;

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
    routes,
};
use tracing::{info, warn};

use crate::{
    cleanup::start_cleanup_task,
    config::ServerConfig,
    cors::create_cors,
    logic::Games,
    rate_limit::{RateLimiter, create_rate_limiter},
    routes::{create_game, websocket_handler},
};

struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        match (
            rocket.state::<Games>(),
            rocket.state::<RateLimiter>(),
            rocket.state::<ServerConfig>(),
        ) {
            (Some(games), Some(rate_limiter), Some(config)) => {
                info!("Starting cleanup task for games and rate limits");
                let games = games.clone();
                let rate_limiter = rate_limiter.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    start_cleanup_task(games, rate_limiter, config).await;
                });
            }
            _ => warn!("Failed to get managed state for cleanup task"),
        }
        Ok(rocket)
    }
}

/// Assembles the server with its state, fairings and routes.
pub fn build(config: ServerConfig) -> Rocket<Build> {
    let games: Games = Arc::new(DashMap::new());
    let rate_limiter = create_rate_limiter();

    info!("📊 Initialized game storage and rate limiter");

    rocket::build()
        .attach(create_cors(&config.cors_allowed_origins))
        .attach(CleanupFairing)
        .manage(games)
        .manage(rate_limiter)
        .manage(config)
        .mount("/", routes![create_game, websocket_handler])
}
