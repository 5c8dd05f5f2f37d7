use minefield_client::{Cell, GameEvent, GameState, MinefieldGame};
use tokio::time::{Duration, sleep};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let game = MinefieldGame::new("http://localhost:8000")?;
    let mut event_receiver = game.subscribe_to_events().await;

    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_receiver.recv().await {
            match event {
                GameEvent::GameInitialized {
                    level,
                    cells,
                    bombs,
                } => {
                    println!(
                        "🎮 Game initialized: level {} with {} cells and {} bombs",
                        level, cells, bombs
                    );
                }
                GameEvent::BoardUpdated { changed_indices } => {
                    println!(
                        "📋 {} cells updated: {:?}",
                        changed_indices.len(),
                        changed_indices
                    );
                }
                GameEvent::GameStatusChanged { won, lost } => {
                    if won {
                        println!("🎉 You won!");
                    } else if lost {
                        println!("💣 Game over!");
                    }
                }
                GameEvent::ServerError { message } => println!("⚠️ {}", message),
                GameEvent::ConnectionLost => {
                    println!("🔌 Connection lost!");
                    break;
                }
            }
        }
    });

    // Level 3 is the 7x7 grid
    game.start_game(3).await?;
    println!(
        "Game started! Game ID: {}",
        game.get_game_id().await.unwrap_or_default()
    );
    sleep(Duration::from_millis(100)).await;

    if let Some(state) = game.get_state().await {
        display_board(&state);
    }

    // Walk the first row until something happens
    for index in 1..=7 {
        println!("\nRevealing cell {}...", index);
        game.reveal(index).await?;
        sleep(Duration::from_millis(100)).await;

        if let Some(state) = game.get_state().await {
            display_board(&state);
            if state.is_game_over() {
                break;
            }
        }
    }

    println!("\nRestarting at level 1...");
    game.restart(1).await?;
    sleep(Duration::from_millis(100)).await;
    if let Some(state) = game.get_state().await {
        display_board(&state);
        println!("Cell counts: {:?}", state.count_cells());
    }

    game.disconnect().await?;
    println!("\nDisconnected from game");

    event_handler.abort();
    let _ = event_handler.await;

    Ok(())
}

fn display_board(state: &GameState) {
    println!("{}", state.message);
    for row in state.rows() {
        print!("  ");
        for cell in row {
            let symbol = match cell {
                Cell::Hidden => "·".to_string(),
                Cell::Revealed { hint: 0 } => " ".to_string(),
                Cell::Revealed { hint } => hint.to_string(),
                Cell::Bomb => "💣".to_string(),
            };
            print!("{:>2}", symbol);
        }
        println!();
    }
}
