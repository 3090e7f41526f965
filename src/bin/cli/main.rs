mod app;
mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "studyhub-cli", about = "Flashcards, study log and certification tracker", version)]
struct Cli {
    /// Use a specific data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Flashcard decks and review
    #[command(subcommand)]
    Cards(CardsCommand),

    /// Activity log
    #[command(subcommand)]
    Log(LogCommand),

    /// Streak and minute totals
    Stats,

    /// Certification notes, sessions and objectives
    #[command(subcommand)]
    Cert(CertCommand),

    /// Freeform study journal
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Export every collection as one JSON backup
    Export {
        /// Output file (default: studyhub_backup.json)
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CardsCommand {
    /// List decks
    List,

    /// Import a deck from a .json or text file
    Import {
        /// Card file (.json array, or blank-line separated Q/A/Why blocks)
        file: PathBuf,
    },

    /// Show review state of a deck
    Show {
        /// Deck id or title (default: example deck, else first)
        deck: Option<String>,
    },

    /// Review a deck interactively
    Review {
        /// Deck id or title (default: example deck, else first)
        deck: Option<String>,
        /// Seed the shuffle for a repeatable order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Toggle shuffle for a deck
    Shuffle {
        deck: Option<String>,
    },

    /// Forget review progress for a deck
    Reset {
        deck: Option<String>,
    },

    /// Add the example deck if it is missing
    Example,
}

#[derive(Subcommand)]
enum LogCommand {
    /// Log a study entry
    Add {
        /// Certification id (default: current)
        #[arg(long)]
        cert: Option<String>,
        /// Entry type
        #[arg(long = "type", default_value = "study_session")]
        kind: String,
        #[arg(long, default_value = "0")]
        minutes: u32,
        #[arg(long)]
        title: Option<String>,
        /// What you did (use "-" to read from stdin)
        #[arg(long)]
        did: Option<String>,
        #[arg(long)]
        learned: Option<String>,
        #[arg(long)]
        next: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Timestamp (RFC 3339), default now
        #[arg(long)]
        at: Option<String>,
    },

    /// List entries, newest first
    List {
        #[arg(long)]
        cert: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        /// First day (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        /// Maximum results
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Delete an entry by id
    Delete {
        id: String,
    },

    /// Delete every entry
    Clear {
        /// Required to actually clear
        #[arg(long)]
        yes: bool,
    },

    /// Export the log as JSON
    Export {
        /// Output file (default: activity.json)
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CertCommand {
    /// List certifications
    List,

    /// Show notes, sessions and objectives
    Show {
        cert: String,
    },

    /// Replace notes (use "-" to read from stdin)
    Notes {
        cert: String,
        text: Option<String>,
    },

    /// Log a study session
    Session {
        cert: String,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, default_value = "0")]
        minutes: u32,
    },

    /// Delete a study session by id
    SessionDelete {
        cert: String,
        id: String,
    },

    /// Replace objectives, one per line (use "-" to read from stdin)
    Objectives {
        cert: String,
        text: Option<String>,
    },

    /// Mark an objective done (1-based)
    Check {
        cert: String,
        number: usize,
    },

    /// Mark an objective not done (1-based)
    Uncheck {
        cert: String,
        number: usize,
    },

    /// Remove an objective (1-based)
    RemoveObjective {
        cert: String,
        number: usize,
    },

    /// Export one certification as JSON
    Export {
        cert: String,
        /// Output file (default: <cert>_data.json)
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum JournalCommand {
    /// Add a note
    Add {
        #[arg(long)]
        cert: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Note body (use "-" to read from stdin)
        #[arg(long)]
        body: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// List notes, newest first
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        cert: Option<String>,
    },

    /// Delete a note by id
    Delete {
        id: String,
    },

    /// Export notes as JSON
    Export {
        /// Output file (default: notes.json)
        path: Option<PathBuf>,
    },
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
            Some(buf)
        }
        Some(_) => content,
        None => {
            if !stdin_is_tty() {
                let mut buf = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
                if buf.is_empty() { None } else { Some(buf) }
            } else {
                None
            }
        }
    }
}

/// Check if stdin is a terminal (not piped)
fn stdin_is_tty() -> bool {
    unsafe { libc_isatty(0) != 0 }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.data_dir)?;
    let format = &cli.format;

    match cli.command {
        Command::Cards(subcmd) => match subcmd {
            CardsCommand::List => commands::cards::run_list(&app, format, use_color)?,
            CardsCommand::Import { file } => commands::cards::run_import(&app, &file, format, use_color)?,
            CardsCommand::Show { deck } => commands::cards::run_show(&app, deck.as_deref(), format, use_color)?,
            CardsCommand::Review { deck, seed } => {
                commands::review::run(&app, deck.as_deref(), seed, use_color)?
            }
            CardsCommand::Shuffle { deck } => {
                commands::cards::run_shuffle(&app, deck.as_deref(), format, use_color)?
            }
            CardsCommand::Reset { deck } => commands::cards::run_reset(&app, deck.as_deref(), format, use_color)?,
            CardsCommand::Example => commands::cards::run_example(&app, format, use_color)?,
        },
        Command::Log(subcmd) => match subcmd {
            LogCommand::Add { cert, kind, minutes, title, did, learned, next, tags, at } => {
                let did = resolve_content(did);
                commands::log::run_add(
                    &app,
                    commands::log::AddArgs {
                        cert,
                        kind,
                        minutes,
                        title,
                        did,
                        learned,
                        next,
                        tags,
                        at,
                    },
                    format,
                    use_color,
                )?;
            }
            LogCommand::List { cert, kind, from, to, search, limit } => {
                commands::log::run_list(
                    &app,
                    commands::log::ListArgs { cert, kind, from, to, search, limit },
                    format,
                    use_color,
                )?;
            }
            LogCommand::Delete { id } => commands::log::run_delete(&app, &id, format, use_color)?,
            LogCommand::Clear { yes } => commands::log::run_clear(&app, yes, format, use_color)?,
            LogCommand::Export { path } => commands::log::run_export(&app, path, format)?,
        },
        Command::Stats => commands::stats::run(&app, format, use_color)?,
        Command::Cert(subcmd) => match subcmd {
            CertCommand::List => commands::cert::run_list(&app, format, use_color)?,
            CertCommand::Show { cert } => commands::cert::run_show(&app, &cert, format, use_color)?,
            CertCommand::Notes { cert, text } => {
                let text = resolve_content(text).context("Provide notes text, \"-\" or pipe it via stdin")?;
                commands::cert::run_notes(&app, &cert, &text, format, use_color)?;
            }
            CertCommand::Session { cert, topic, minutes } => {
                commands::cert::run_session(&app, &cert, topic.as_deref(), minutes, format, use_color)?
            }
            CertCommand::SessionDelete { cert, id } => {
                commands::cert::run_session_delete(&app, &cert, &id, format, use_color)?
            }
            CertCommand::Objectives { cert, text } => {
                let text = resolve_content(text).context("Provide objectives, \"-\" or pipe them via stdin")?;
                commands::cert::run_objectives(&app, &cert, &text, format, use_color)?;
            }
            CertCommand::Check { cert, number } => {
                commands::cert::run_set_done(&app, &cert, number, true, format, use_color)?
            }
            CertCommand::Uncheck { cert, number } => {
                commands::cert::run_set_done(&app, &cert, number, false, format, use_color)?
            }
            CertCommand::RemoveObjective { cert, number } => {
                commands::cert::run_remove_objective(&app, &cert, number, format, use_color)?
            }
            CertCommand::Export { cert, path } => commands::cert::run_export(&app, &cert, path, format)?,
        },
        Command::Journal(subcmd) => match subcmd {
            JournalCommand::Add { cert, title, body, tags } => {
                let body = resolve_content(body);
                commands::journal::run_add(
                    &app,
                    cert.as_deref(),
                    title.as_deref(),
                    body.as_deref(),
                    tags.as_deref(),
                    format,
                    use_color,
                )?;
            }
            JournalCommand::List { search, cert } => {
                commands::journal::run_list(&app, search.as_deref(), cert.as_deref(), format, use_color)?
            }
            JournalCommand::Delete { id } => commands::journal::run_delete(&app, &id, format, use_color)?,
            JournalCommand::Export { path } => commands::journal::run_export(&app, path, format)?,
        },
        Command::Export { path } => commands::export::run(&app, path, format)?,
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
