//! Plays a round in the terminal without a server.
//!
//! Usage: `cargo run --example local_game -- [level]` then type cell indices.

use std::io::{self, BufRead, Write};

use minefield_common::{Activation, Level, Session};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let level_id = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u8>())
        .transpose()?
        .unwrap_or(1);
    let level = Level::try_from(level_id)?;

    let mut session = Session::start(level, &mut rand::rng())?;
    println!("Playing {}. Cells are numbered 1 to {}.", level, level.cell_count());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.status().is_over() {
        print!("{}{}\ncell> ", session, session.status_message());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let Ok(index) = line?.trim().parse::<usize>() else {
            println!("Enter a cell number.");
            continue;
        };

        match session.on_cell_activated(index) {
            Activation::Revealed { hint } => println!("Cell {} has {} bombs nearby.", index, hint),
            Activation::Detonated => println!("💣 Cell {} was a bomb!", index),
            Activation::Invalid(reason) => println!("Cannot reveal {}: {:?}", index, reason),
        }
    }

    print!("{}", session);
    println!("{}", session.status_message());
    Ok(())
}
