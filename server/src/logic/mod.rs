use std::{sync::Arc, time::Instant};

use dashmap::DashMap;
use rocket::futures::{SinkExt, stream::SplitSink};
use rocket_ws::{Message, stream::DuplexStream};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use minefield_common::{
    Activation, GridError, Level, RoundStatus, Session,
    models::Cell,
    protocol::{CellUpdate, ClientMessage, ServerMessage},
};

pub type Games = Arc<DashMap<String, Arc<Mutex<Game>>>>;

type PlayerStream = SplitSink<DuplexStream, Message>;

/// A hosted round plus the single player connection attached to it.
pub struct Game {
    level: Level,
    session: Session,
    player: Option<(Uuid, PlayerStream)>,
    created: Instant,
    last_activity: Instant,
}

async fn send(stream: &mut PlayerStream, message: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(message) {
        let _ = stream.send(Message::Text(text)).await;
    }
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(level: Level) -> Result<Self, GridError> {
        info!("Creating new game: {}", level);
        let session = Session::start(level, &mut rand::rng())?;
        Ok(Self::with_session(level, session))
    }

    pub fn with_session(level: Level, session: Session) -> Self {
        let now = Instant::now();
        Self {
            level,
            session,
            player: None,
            created: now,
            last_activity: now,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn init_message(&self) -> ServerMessage {
        ServerMessage::Init {
            level: self.level.id(),
            cells: self.session.grid().cells(),
            columns: self.session.grid().columns(),
            bombs: self.session.bombs().len(),
            score: self.session.score(),
            field: self.session.board().into_iter().map(Cell::from).collect(),
        }
    }

    fn update_message(&self, updates: Vec<CellUpdate>) -> ServerMessage {
        let status = self.session.status();
        ServerMessage::Update {
            updates,
            score: self.session.score(),
            won: status == RoundStatus::Won,
            lost: status == RoundStatus::Lost,
            message: self.session.status_message(),
        }
    }

    /// Applies a player action and returns the reply to send, if any.
    /// Actions that change nothing produce no reply.
    #[instrument(level = "trace", skip(self))]
    pub fn apply(&mut self, message: ClientMessage) -> Option<ServerMessage> {
        self.last_activity = Instant::now();

        match message {
            ClientMessage::Reveal { index } => self.reveal(index),
            ClientMessage::Restart { level } => Some(self.restart(level)),
        }
    }

    fn bomb_updates(&self) -> impl Iterator<Item = CellUpdate> + '_ {
        self.session.bombs().iter().map(|index| CellUpdate {
            index,
            value: Cell::Bomb,
        })
    }

    fn reveal(&mut self, index: usize) -> Option<ServerMessage> {
        match self.session.on_cell_activated(index) {
            Activation::Revealed { hint } => {
                debug!("Revealed cell {} with hint {}", index, hint);
                let mut updates = vec![CellUpdate {
                    index,
                    value: Cell::Revealed { hint },
                }];
                if self.session.status() == RoundStatus::Won {
                    updates.extend(self.bomb_updates());
                    info!("Game won, uncovered {} bombs", self.session.bombs().len());
                }
                Some(self.update_message(updates))
            }
            Activation::Detonated => {
                let updates: Vec<_> = self.bomb_updates().collect();
                info!("Game ended with loss, revealed {} bombs", updates.len());
                Some(self.update_message(updates))
            }
            Activation::Invalid(reason) => {
                debug!("Ignoring reveal of cell {}: {:?}", index, reason);
                None
            }
        }
    }

    fn restart(&mut self, level_id: u8) -> ServerMessage {
        let started = Level::try_from(level_id).and_then(|level| {
            Session::start(level, &mut rand::rng()).map(|session| (level, session))
        });

        match started {
            Ok((level, session)) => {
                self.level = level;
                self.session = session;
                info!("Game restarted at {}", level);
                self.init_message()
            }
            Err(e) => {
                warn!("Restart rejected: {}", e);
                ServerMessage::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Handles an action from the attached player and sends the reply back.
    pub async fn handle(&mut self, message: ClientMessage) {
        let Some(reply) = self.apply(message) else {
            return;
        };

        if let Some((_, stream)) = self.player.as_mut() {
            send(stream, &reply).await;
        }
    }

    /// Attaches the player's stream and sends it the current board. Returns
    /// `None` when another player is already attached; that stream is told so
    /// and dropped.
    #[instrument(level = "trace", skip(self, stream))]
    pub async fn attach(&mut self, mut stream: PlayerStream) -> Option<Uuid> {
        if let Some((current, _)) = &self.player {
            warn!("Rejecting second connection, player {} attached", current);
            send(
                &mut stream,
                &ServerMessage::Error {
                    message: "game already has a player".to_string(),
                },
            )
            .await;
            let _ = stream.close().await;
            return None;
        }

        let id = Uuid::new_v4();
        send(&mut stream, &self.init_message()).await;
        self.player = Some((id, stream));
        self.last_activity = Instant::now();
        info!("Player {} attached", id);
        Some(id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, id: &Uuid) {
        match &self.player {
            Some((current, _)) if current == id => {
                self.player = None;
                info!("Player {} detached", id);
            }
            _ => warn!("Attempted to detach unknown player: {}", id),
        }
        self.last_activity = Instant::now();
    }

    pub fn has_active_connections(&self) -> bool {
        self.player.is_some()
    }

    pub fn should_cleanup(&self, inactive_timeout_secs: u64, active_timeout_secs: u64) -> bool {
        self.should_cleanup_at(Instant::now(), inactive_timeout_secs, active_timeout_secs)
    }

    fn should_cleanup_at(
        &self,
        now: Instant,
        inactive_timeout_secs: u64,
        active_timeout_secs: u64,
    ) -> bool {
        if now.saturating_duration_since(self.created).as_secs() > active_timeout_secs {
            return true;
        }

        if self.has_active_connections() {
            return false;
        }

        now.saturating_duration_since(self.last_activity).as_secs() > inactive_timeout_secs
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use minefield_common::{BombSet, Grid};

    use super::*;

    fn game(cells: usize, bombs: &[usize]) -> Game {
        let grid = Grid::new(cells).unwrap();
        let set = BombSet::from_indices(&grid, bombs.iter().copied()).unwrap();
        Game::with_session(Level::Hard, Session::with_bombs(cells, set).unwrap())
    }

    #[test]
    fn init_describes_a_hidden_board() {
        let game = Game::new(Level::Medium).unwrap();
        match game.init_message() {
            ServerMessage::Init {
                level,
                cells,
                columns,
                bombs,
                score,
                field,
            } => {
                assert_eq!(level, 2);
                assert_eq!(cells, 81);
                assert_eq!(columns, 9);
                assert_eq!(bombs, 16);
                assert_eq!(score, 0);
                assert_eq!(field.len(), 81);
                assert!(field.iter().all(|cell| *cell == Cell::Hidden));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn reveal_reports_hint_and_score() {
        let mut game = game(9, &[1, 3]);
        match game.apply(ClientMessage::Reveal { index: 2 }) {
            Some(ServerMessage::Update {
                updates,
                score,
                won,
                lost,
                message,
            }) => {
                assert_eq!(updates.len(), 1);
                assert_eq!(updates[0].index, 2);
                assert_eq!(updates[0].value, Cell::Revealed { hint: 2 });
                assert_eq!(score, 1);
                assert!(!won && !lost);
                assert_eq!(message, "Your score is 1");
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn repeated_or_invalid_reveals_are_silent() {
        let mut game = game(9, &[1]);
        assert!(game.apply(ClientMessage::Reveal { index: 5 }).is_some());
        assert!(game.apply(ClientMessage::Reveal { index: 5 }).is_none());
        assert!(game.apply(ClientMessage::Reveal { index: 0 }).is_none());
        assert!(game.apply(ClientMessage::Reveal { index: 99 }).is_none());
    }

    #[test]
    fn detonation_uncovers_every_bomb() {
        let mut game = game(9, &[1, 7, 9]);
        match game.apply(ClientMessage::Reveal { index: 7 }) {
            Some(ServerMessage::Update {
                updates, won, lost, ..
            }) => {
                let indices: Vec<_> = updates.iter().map(|u| u.index).collect();
                assert_eq!(indices, vec![1, 7, 9]);
                assert!(updates.iter().all(|u| u.value == Cell::Bomb));
                assert!(lost && !won);
            }
            other => panic!("unexpected reply {:?}", other),
        }
        assert!(game.apply(ClientMessage::Reveal { index: 5 }).is_none());
    }

    #[test]
    fn last_safe_cell_wins() {
        let mut game = game(4, &[1, 2, 3]);
        match game.apply(ClientMessage::Reveal { index: 4 }) {
            Some(ServerMessage::Update {
                updates, won, lost, ..
            }) => {
                assert!(won && !lost);
                assert_eq!(updates[0].index, 4);
                assert_eq!(updates[0].value, Cell::Revealed { hint: 3 });
                let bombs: Vec<_> = updates[1..]
                    .iter()
                    .filter(|u| u.value == Cell::Bomb)
                    .map(|u| u.index)
                    .collect();
                assert_eq!(bombs, vec![1, 2, 3]);
                assert_eq!(updates.len(), 4);
            }
            other => panic!("unexpected reply {:?}", other),
        }
        match game.init_message() {
            ServerMessage::Init { field, .. } => {
                assert_eq!(&field[..3], &[Cell::Bomb, Cell::Bomb, Cell::Bomb]);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn restart_switches_level() {
        let mut game = game(9, &[1]);
        match game.apply(ClientMessage::Restart { level: 1 }) {
            Some(ServerMessage::Init { level, cells, .. }) => {
                assert_eq!(level, 1);
                assert_eq!(cells, 100);
            }
            other => panic!("unexpected reply {:?}", other),
        }
        assert_eq!(game.session().grid().cells(), 100);
    }

    #[test]
    fn restart_with_unknown_level_keeps_the_round() {
        let mut game = game(9, &[1]);
        game.apply(ClientMessage::Reveal { index: 5 });
        match game.apply(ClientMessage::Restart { level: 7 }) {
            Some(ServerMessage::Error { message }) => {
                assert_eq!(message, "unknown difficulty level 7")
            }
            other => panic!("unexpected reply {:?}", other),
        }
        assert_eq!(game.session().score(), 1);
    }

    #[test]
    fn idle_games_are_cleaned_up() {
        let game = game(9, &[1]);
        let now = Instant::now();
        assert!(!game.should_cleanup_at(now, 600, 86400));
        assert!(game.should_cleanup_at(now + Duration::from_secs(601), 600, 86400));
        assert!(game.should_cleanup_at(now + Duration::from_secs(86401), 600, 86400));
    }
}
