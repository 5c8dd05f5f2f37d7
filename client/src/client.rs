use minefield_common::{
    Level,
    models::{CreateResponse, GameParams},
};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::{ClientError, MinefieldWebSocket, Result};

/// Entry point to a minefield server: creates rounds and opens their sockets.
///
/// Paths are resolved relative to the base URL, so a server mounted under a
/// prefix works when the base ends with `/`.
pub struct MinefieldClient {
    http: Client,
    base_url: Url,
}

impl MinefieldClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    /// Creates a round at `level_id` and returns its id. Unknown levels are
    /// refused here, before anything reaches the server.
    pub async fn create_game(&self, level_id: u8) -> Result<String> {
        let level = Level::try_from(level_id)?;
        debug!("Requesting a {} round", level);

        let response = self
            .http
            .post(self.base_url.join("create")?)
            .json(&GameParams { level: level.id() })
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited),
            status if !status.is_success() => Err(ClientError::Refused(status)),
            _ => {
                let created: CreateResponse = response.json().await?;
                info!("Server created {} round {}", level, created.id);
                Ok(created.id)
            }
        }
    }

    /// WebSocket address of a round: `ws` for `http` servers, `wss` for `https`.
    pub fn websocket_url(&self, game_id: &str) -> Result<Url> {
        let mut url = self.base_url.join("ws")?;
        let scheme = if self.base_url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::WebSocketUrl(self.base_url.to_string()))?;
        url.query_pairs_mut().clear().append_pair("id", game_id);
        Ok(url)
    }

    /// Opens the player connection to a round.
    pub async fn connect(&self, game_id: &str) -> Result<MinefieldWebSocket> {
        MinefieldWebSocket::connect(&self.websocket_url(game_id)?).await
    }
}
