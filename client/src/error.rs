use minefield_common::GridError;
use reqwest::StatusCode;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid level: {0}")]
    Level(#[from] GridError),

    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("cannot derive a WebSocket URL from {0}")]
    WebSocketUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("too many games created, try again in a minute")]
    RateLimited,

    #[error("server refused to create the game: {0}")]
    Refused(StatusCode),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("malformed server message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("not connected to a game, call start_game() first")]
    NotConnected,

    #[error("connection to the game is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
