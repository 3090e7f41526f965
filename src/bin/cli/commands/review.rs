use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use studyhub_lib::flashcards::ReviewEngine;

use crate::app::App;
use crate::render::terminal::{self, Color};

const HELP: &str = "[enter/f] flip  [c] correct  [w] wrong  [n] next  [s] shuffle  [r] reset  [q] quit";

/// Line-driven review loop over stdin
pub fn run(app: &App, deck: Option<&str>, seed: Option<u64>, use_color: bool) -> Result<()> {
    let deck = app.find_deck(deck)?;
    let mut engine = match seed {
        Some(seed) => ReviewEngine::with_rng(app.hub.store(), StdRng::seed_from_u64(seed)),
        None => app.hub.review(),
    };
    engine.load_deck(&deck.id).context("Failed to load deck")?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        println!("{}", terminal::render_card(&engine.snapshot(), use_color));
        println!("{}", terminal::paint(HELP, Color::GRAY, use_color));
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;

        match line.trim().to_lowercase().as_str() {
            "" | "f" | "flip" => {
                engine.flip();
            }
            "c" | "correct" => mark(&mut engine, true, use_color)?,
            "w" | "wrong" => mark(&mut engine, false, use_color)?,
            "n" | "next" => engine.advance().context("Failed to save progress")?,
            "s" | "shuffle" => {
                let enabled = engine.toggle_shuffle().context("Failed to save progress")?;
                println!("Shuffle {}", if enabled { "on" } else { "off" });
            }
            "r" | "reset" => {
                engine.reset_progress(&deck.id).context("Failed to reset progress")?;
                println!("Deck progress reset.");
            }
            "q" | "quit" | "exit" => break,
            other => terminal::notice(&format!("Unknown command '{}'", other), use_color),
        }
    }

    let stats = engine.stats();
    println!("Session saved: {} correct, {} wrong", stats.correct, stats.wrong);
    Ok(())
}

fn mark(engine: &mut ReviewEngine<'_>, correct: bool, use_color: bool) -> Result<()> {
    match engine.mark(correct) {
        Ok(Some(outcome)) => {
            let (label, color) = if outcome.correct { ("correct", Color::GREEN) } else { ("wrong", Color::RED) };
            println!("{}", terminal::paint(&format!("Marked {}", label), color, use_color));
        }
        Ok(None) => terminal::notice("No cards in this deck.", use_color),
        Err(e) if e.is_rejection() => terminal::notice(&e.to_string(), use_color),
        Err(e) => return Err(e).context("Failed to record answer"),
    }
    Ok(())
}
