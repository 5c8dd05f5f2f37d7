use std::collections::HashMap;
use std::sync::Arc;

use minefield_common::{
    models::Cell,
    protocol::{ClientMessage, ServerMessage},
};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{ClientError, MinefieldClient, MinefieldWebSocket, Result};

/// Events emitted by the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Some cells changed state
    BoardUpdated {
        /// 1-based indices of the cells that changed
        changed_indices: Vec<usize>,
    },
    /// The round was won or lost
    GameStatusChanged { won: bool, lost: bool },
    /// A round was started or restarted
    GameInitialized { level: u8, cells: usize, bombs: usize },
    /// The server refused an action
    ServerError { message: String },
    /// Connection was lost
    ConnectionLost,
}

/// Local mirror of a hosted round
#[derive(Debug, Clone)]
pub struct GameState {
    pub level: u8,
    pub cells: usize,
    pub columns: usize,
    pub bombs: usize,
    pub score: usize,
    pub board: Vec<Cell>,
    pub message: String,
    pub game_over: bool,
    pub won: bool,
}

impl GameState {
    pub fn new(
        level: u8,
        cells: usize,
        columns: usize,
        bombs: usize,
        score: usize,
        board: Vec<Cell>,
    ) -> Self {
        Self {
            level,
            cells,
            columns,
            bombs,
            score,
            board,
            message: format!("Your score is {}", score),
            game_over: false,
            won: false,
        }
    }

    /// Get the cell at a 1-based index
    pub fn get_cell(&self, index: usize) -> Option<&Cell> {
        self.board.get(index.checked_sub(1)?)
    }

    /// Update the cell at a 1-based index
    pub fn set_cell(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = index.checked_sub(1)
            && let Some(cell_ref) = self.board.get_mut(slot)
        {
            *cell_ref = cell;
        }
    }

    /// Count the number of cells in each state
    pub fn count_cells(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for cell in &self.board {
            let state = match cell {
                Cell::Hidden => "hidden",
                Cell::Revealed { .. } => "revealed",
                Cell::Bomb => "bomb",
            };
            *counts.entry(state).or_insert(0) += 1;
        }
        counts
    }

    /// Check if the round is over (won or lost)
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Check if the player has won
    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Rows of the board, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.board.chunks(self.columns.max(1))
    }
}

/// Folds a server message into the local state and returns the events it causes.
fn apply_server_message(state: &mut Option<GameState>, message: ServerMessage) -> Vec<GameEvent> {
    match message {
        ServerMessage::Init {
            level,
            cells,
            columns,
            bombs,
            score,
            field,
        } => {
            info!(
                "Received game initialization: level {} with {} cells and {} bombs",
                level, cells, bombs
            );
            *state = Some(GameState::new(level, cells, columns, bombs, score, field));
            vec![GameEvent::GameInitialized {
                level,
                cells,
                bombs,
            }]
        }
        ServerMessage::Update {
            updates,
            score,
            won,
            lost,
            message,
        } => {
            debug!(
                "Received update: {} cells updated, won: {}, lost: {}",
                updates.len(),
                won,
                lost
            );

            let Some(game_state) = state.as_mut() else {
                warn!("Update received before initialization, ignoring");
                return Vec::new();
            };

            let changed_indices: Vec<usize> = updates.iter().map(|u| u.index).collect();
            for update in updates {
                game_state.set_cell(update.index, update.value);
            }

            let was_over = game_state.game_over;
            game_state.score = score;
            game_state.message = message;
            game_state.won = won;
            game_state.game_over = won || lost;

            let mut events = Vec::new();
            if !changed_indices.is_empty() {
                events.push(GameEvent::BoardUpdated { changed_indices });
            }
            if game_state.game_over != was_over {
                events.push(GameEvent::GameStatusChanged { won, lost });
            }
            events
        }
        ServerMessage::Error { message } => {
            warn!("Server rejected action: {}", message);
            vec![GameEvent::ServerError { message }]
        }
    }
}

/// Connection state - all fields are required when connected
struct ConnectionState {
    websocket_sender: mpsc::UnboundedSender<ClientMessage>,
    game_id: String,
    background_task: JoinHandle<()>,
}

impl ConnectionState {
    fn send_message(&self, message: ClientMessage) -> Result<()> {
        self.websocket_sender
            .send(message)
            .map_err(|_| ClientError::Closed)
    }

    async fn abort_and_wait_background_task(self) {
        self.background_task.abort();
        let _ = self.background_task.await;
    }
}

type EventSender = Arc<RwLock<Option<mpsc::UnboundedSender<GameEvent>>>>;

/// High-level game client that mirrors the round's state locally
pub struct MinefieldGame {
    client: MinefieldClient,
    connection_state: Arc<RwLock<Option<ConnectionState>>>,
    event_sender: EventSender,
    state: Arc<RwLock<Option<GameState>>>,
}

impl MinefieldGame {
    pub fn new(server_url: &str) -> Result<Self> {
        let client = MinefieldClient::new(server_url)?;
        Ok(Self {
            client,
            connection_state: Arc::new(RwLock::new(None)),
            event_sender: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(None)),
        })
    }

    /// Subscribe to game events. Replaces any earlier subscriber.
    pub async fn subscribe_to_events(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.event_sender.write().await = Some(sender);
        receiver
    }

    /// Create a game at `level` on the server and join it
    pub async fn start_game(&self, level: u8) -> Result<()> {
        info!("Starting new game at level {}", level);

        let game_id = self.client.create_game(level).await?;
        info!("Created game with ID: {}", game_id);

        self.join_game(game_id).await
    }

    pub async fn join_game(&self, game_id: String) -> Result<()> {
        info!("Joining game with ID: {}", game_id);

        let mut conn_state = self.connection_state.write().await;

        if let Some(existing_conn) = conn_state.take() {
            existing_conn.abort_and_wait_background_task().await;
        }
        self.state.write().await.take();

        let websocket = self.client.connect(&game_id).await?;
        let websocket_sender = websocket.actions();

        info!("Connected to game with ID: {}", game_id);

        let background_task = self.start_background_listener(websocket);

        *conn_state = Some(ConnectionState {
            websocket_sender,
            game_id,
            background_task,
        });

        Ok(())
    }

    async fn send_client_message(&self, message: ClientMessage) -> Result<()> {
        let conn_state = self.connection_state.read().await;

        match conn_state.as_ref() {
            Some(conn) => conn.send_message(message),
            None => Err(ClientError::NotConnected),
        }
    }

    /// Reveal the cell at a 1-based index
    pub async fn reveal(&self, index: usize) -> Result<()> {
        debug!("Revealing cell {}", index);
        self.send_client_message(ClientMessage::Reveal { index })
            .await
    }

    /// Throw the current round away and start one at `level`
    pub async fn restart(&self, level: u8) -> Result<()> {
        info!("Restarting game at level {}", level);
        self.send_client_message(ClientMessage::Restart { level })
            .await
    }

    pub async fn get_state(&self) -> Option<GameState> {
        self.state.read().await.clone()
    }

    pub async fn get_game_id(&self) -> Option<String> {
        let conn_state = self.connection_state.read().await;
        conn_state.as_ref().map(|conn| conn.game_id.clone())
    }

    pub async fn is_connected(&self) -> bool {
        self.connection_state.read().await.is_some()
    }

    /// Close the connection and clean up
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(conn) = self.connection_state.write().await.take() {
            conn.abort_and_wait_background_task().await;
        }

        *self.event_sender.write().await = None;
        *self.state.write().await = None;

        info!("Disconnected from game");
        Ok(())
    }

    fn start_background_listener(&self, mut websocket: MinefieldWebSocket) -> JoinHandle<()> {
        let state = self.state.clone();
        let event_sender = self.event_sender.clone();

        tokio::spawn(async move {
            Self::background_message_handler(&mut websocket, state, event_sender).await;
        })
    }

    async fn background_message_handler(
        websocket: &mut MinefieldWebSocket,
        state: Arc<RwLock<Option<GameState>>>,
        event_sender: EventSender,
    ) {
        loop {
            let message = match websocket.next_message().await {
                Ok(Some(msg)) => msg,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error receiving WebSocket message: {}", e);
                    break;
                }
            };

            let events = apply_server_message(&mut *state.write().await, message);

            if let Some(sender) = event_sender.read().await.as_ref() {
                for event in events {
                    let _ = sender.send(event);
                }
            }
        }

        if let Some(sender) = event_sender.read().await.as_ref() {
            let _ = sender.send(GameEvent::ConnectionLost);
        }
    }
}
