use std::path::Path;

use anyhow::{Context, Result};

use studyhub_lib::flashcards::{FlashcardError, EXAMPLE_DECK_ID};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let decks = app.hub.decks().list_decks();
    let default_id = app.hub.decks().default_deck_id();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = decks.iter().map(|deck| {
                let progress = app.hub.decks().get_progress(&deck.id);
                serde_json::json!({
                    "id": deck.id,
                    "title": deck.title,
                    "cards": deck.cards.len(),
                    "isDefault": Some(&deck.id) == default_id.as_ref(),
                    "stats": progress.as_ref().map(|p| p.stats),
                    "shuffle": progress.as_ref().map(|p| p.shuffle).unwrap_or(false),
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("No decks. Import one with `cards import <file>`.");
                return Ok(());
            }

            let title_width = decks.iter().map(|d| d.title.chars().count()).max().unwrap_or(5).clamp(5, 40);

            println!("  {:<tw$} {:>6} {:>8} {:>6}  {}", "Title", "Cards", "Correct", "Wrong", "Id", tw = title_width);
            for deck in &decks {
                let marker = if Some(&deck.id) == default_id.as_ref() { "* " } else { "  " };
                let stats = app.hub.decks().get_progress(&deck.id).map(|p| p.stats).unwrap_or_default();
                let title = terminal::truncate(&deck.title, title_width);
                println!(
                    "{}{:<tw$} {:>6} {:>8} {:>6}  {}",
                    marker,
                    title,
                    deck.cards.len(),
                    stats.correct,
                    stats.wrong,
                    terminal::paint(&deck.id, Color::GRAY, use_color),
                    tw = title_width
                );
            }
        }
    }

    Ok(())
}

pub fn run_import(app: &App, file: &Path, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut engine = app.hub.review();
    let deck = match engine.import_file(file) {
        Ok(deck) => deck,
        Err(e) if e.is_rejection() => {
            terminal::notice(&e.to_string(), use_color);
            return Ok(());
        }
        Err(FlashcardError::Io(e)) => {
            return Err(e).with_context(|| format!("Failed to read {}", file.display()));
        }
        Err(e) => return Err(e).context("Failed to import deck"),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "id": deck.id,
                "title": deck.title,
                "cards": deck.cards.len(),
            }))?);
        }
        OutputFormat::Plain => {
            println!(
                "Imported deck: {} ({} cards) {}",
                deck.title,
                deck.cards.len(),
                terminal::paint(&deck.id, Color::GRAY, use_color)
            );
        }
    }

    Ok(())
}

pub fn run_show(app: &App, deck: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let deck = app.find_deck(deck)?;
    let mut engine = app.hub.review();
    engine.load_deck(&deck.id).context("Failed to load deck")?;
    let snapshot = engine.snapshot();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "deck": snapshot,
                "queue": engine.queue().iter().map(|c| &c.id).collect::<Vec<_>>(),
            }))?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::render_card(&snapshot, use_color));
            println!();
            println!("Up next:");
            for (i, card) in engine.queue().iter().take(5).enumerate() {
                println!("  {}. {}", i + 1, terminal::truncate(&card.question, 70));
            }
        }
    }

    Ok(())
}

pub fn run_shuffle(app: &App, deck: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let deck = app.find_deck(deck)?;
    let mut engine = app.hub.review();
    engine.load_deck(&deck.id).context("Failed to load deck")?;
    let enabled = engine.toggle_shuffle().context("Failed to save progress")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "id": deck.id, "shuffle": enabled }));
        }
        OutputFormat::Plain => {
            let state = if enabled { "on" } else { "off" };
            println!("Shuffle {} for {}", terminal::paint(state, Color::BOLD, use_color), deck.title);
        }
    }

    Ok(())
}

pub fn run_reset(app: &App, deck: Option<&str>, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let deck = app.find_deck(deck)?;
    let mut engine = app.hub.review();
    engine.reset_progress(&deck.id).context("Failed to reset progress")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": deck.id, "reset": true })),
        OutputFormat::Plain => println!("Deck progress reset: {}", deck.title),
    }

    Ok(())
}

pub fn run_example(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let available = app.hub.ensure_example_deck().context("Failed to add example deck")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": EXAMPLE_DECK_ID, "available": available })),
        OutputFormat::Plain => {
            if available {
                println!("Example deck ready. Review it with `cards review {}`.", EXAMPLE_DECK_ID);
            } else {
                let path = app
                    .hub
                    .data_dir()
                    .map(|dir| app.hub.config().example_deck_path(dir));
                let hint = path.map(|p| format!(" (expected at {})", p.display())).unwrap_or_default();
                terminal::notice(&format!("Example deck not available{}.", hint), use_color);
            }
        }
    }

    Ok(())
}
