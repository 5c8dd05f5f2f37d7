//! Minefield Client Library
//!
//! A Rust client for the minefield server: HTTP calls to create rounds and a
//! WebSocket connection to play them.
//!
//! ## Usage
//!
//! ### High-Level Interface (Recommended)
//!
//! `MinefieldGame` mirrors the round locally and offers one method per action:
//!
//! ```rust,no_run
//! use minefield_client::MinefieldGame;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let game = MinefieldGame::new("http://localhost:8000")?;
//!
//!     // Level 3 is the 7x7 grid
//!     game.start_game(3).await?;
//!     game.reveal(25).await?;
//!
//!     if let Some(state) = game.get_state().await {
//!         println!("{} (game over: {})", state.message, state.is_game_over());
//!     }
//!
//!     game.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Low-Level Interface
//!
//! ```rust,no_run
//! use minefield_client::MinefieldClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let client = MinefieldClient::new("http://localhost:8000")?;
//!     let game_id = client.create_game(1).await?;
//!
//!     let mut ws = client.connect(&game_id).await?;
//!     if let Some(message) = ws.next_message().await? {
//!         println!("Received: {:?}", message);
//!     }
//!
//!     ws.reveal(1)?;
//!     ws.close().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod game;
mod websocket;

pub use client::MinefieldClient;
pub use error::{ClientError, Result};
pub use game::{GameEvent, GameState, MinefieldGame};
pub use websocket::MinefieldWebSocket;

// Re-export common types for convenience
pub use minefield_common::{models::*, protocol::*};
