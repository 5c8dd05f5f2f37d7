use std::sync::Arc;

use dashmap::Entry;
use nanoid::nanoid;
use rocket::{State, futures::StreamExt, get, http::Status, post, serde::json::Json};
use rocket_ws::{Channel, Message, WebSocket};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use minefield_common::{
    Level,
    models::{CreateResponse, GameParams},
    protocol::ClientMessage,
};

use crate::{
    config::ServerConfig,
    logic::{Game, Games},
    rate_limit::{ClientIp, RateLimiter, check_rate_limit},
};

/// What a frame from the player means for the round.
#[derive(Debug)]
enum Inbound {
    Action(ClientMessage),
    Malformed(String),
    Closed,
    Ignored,
}

fn inbound(message: Message) -> Inbound {
    match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(action) => Inbound::Action(action),
            Err(e) => Inbound::Malformed(format!("{} - Error: {}", text, e)),
        },
        Message::Close(_) => Inbound::Closed,
        _ => Inbound::Ignored,
    }
}

#[instrument(level = "trace", skip(games, game))]
fn add_game(games: &Games, game: Game) -> String {
    let mut id_length = 5;
    let max_attempts_per_length = 10;

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match games.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Game ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(game)));
                    info!("Created new game with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

#[post("/create", data = "<params>")]
#[instrument(level = "trace", skip(games, rate_limiter, config), fields(client_ip = %client_ip.0, level = params.level))]
pub fn create_game(
    params: Json<GameParams>,
    games: &State<Games>,
    rate_limiter: &State<RateLimiter>,
    config: &State<ServerConfig>,
    client_ip: ClientIp,
) -> Result<Json<CreateResponse>, Status> {
    info!(
        "Game creation request from {}: level {}",
        client_ip.0, params.level
    );

    let level = Level::try_from(params.level).map_err(|e| {
        warn!("Rejecting game creation from {}: {}", client_ip.0, e);
        Status::UnprocessableEntity
    })?;

    check_rate_limit(rate_limiter, &client_ip.0, config.games_per_minute)?;

    let game = Game::new(level).map_err(|e| {
        error!("Failed to generate a {} round: {}", level, e);
        Status::InternalServerError
    })?;
    let id = add_game(games, game);

    info!(
        "Successfully created game {} for client {}",
        id, client_ip.0
    );
    Ok(Json(CreateResponse { id }))
}

#[get("/ws?<id>")]
#[instrument(level = "trace", skip(ws, games), fields(game_id = %id))]
pub fn websocket_handler(
    ws: WebSocket,
    games: &State<Games>,
    id: String,
) -> Result<Channel<'static>, Status> {
    let game = match games.get(&id) {
        None => {
            warn!("WebSocket connection attempt for non-existent game: {}", id);
            return Err(Status::NotFound);
        }
        Some(value) => value.value().clone(),
    };

    if let Ok(guard) = game.try_lock()
        && guard.has_active_connections()
    {
        warn!("Game {} already has a player", id);
        return Err(Status::Conflict);
    }

    info!("WebSocket connection established for game: {}", id);

    Ok(ws.channel(move |stream| {
        let game_id = id.clone();
        Box::pin(async move {
            let (write, mut read) = stream.split();

            let Some(player_id) = game.lock().await.attach(write).await else {
                return Ok(());
            };

            info!("Player {} joined game {}", player_id, game_id);

            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        error!(
                            "WebSocket error in game {} (player: {}): {}",
                            game_id, player_id, e
                        );
                        break;
                    }
                };

                match inbound(message) {
                    Inbound::Action(action) => {
                        debug!("Received action in game {}: {:?}", game_id, action);
                        game.lock().await.handle(action).await;
                    }
                    Inbound::Malformed(reason) => {
                        warn!("Invalid message format in game {}: {}", game_id, reason);
                    }
                    Inbound::Ignored => {
                        debug!("Ignoring non-text frame in game {}", game_id);
                    }
                    Inbound::Closed => {
                        info!(
                            "WebSocket connection closed for game {} (player: {})",
                            game_id, player_id
                        );
                        break;
                    }
                }
            }

            game.lock().await.detach(&player_id);

            info!("Player {} left game {}", player_id, game_id);
            Ok(())
        })
    }))
}
