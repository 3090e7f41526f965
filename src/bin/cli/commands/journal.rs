use std::path::PathBuf;

use anyhow::{Context, Result};

use studyhub_lib::certs::cert_title;
use studyhub_lib::journal::NewNote;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    cert: Option<&str>,
    title: Option<&str>,
    body: Option<&str>,
    tags: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let request = NewNote {
        cert_id: app.resolve_cert(cert)?,
        title: title.unwrap_or_default().to_string(),
        body: body.unwrap_or_default().to_string(),
        tags: tags.unwrap_or_default().to_string(),
    };

    let note = match app.hub.journal().add(request) {
        Ok(note) => note,
        Err(e) if e.is_rejection() => {
            terminal::notice(&e.to_string(), use_color);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to add note"),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Plain => println!("Note added. {}", terminal::paint(&note.id, Color::GRAY, use_color)),
    }

    Ok(())
}

pub fn run_list(
    app: &App,
    search: Option<&str>,
    cert: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let cert_id = cert.map(|c| app.resolve_cert(Some(c))).transpose()?;
    let notes = app.hub.journal().search(search, cert_id.as_deref());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
        OutputFormat::Plain => {
            if notes.is_empty() {
                println!("No notes match your search.");
                return Ok(());
            }

            for note in &notes {
                let title = if note.title.is_empty() { "(untitled)" } else { &note.title };
                let when = note.ts.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M");
                println!(
                    "{}  {}",
                    terminal::paint(&format!("[{}] {}", cert_title(&note.cert_id), title), Color::BOLD, use_color),
                    terminal::paint(&when.to_string(), Color::DIM, use_color)
                );
                if !note.tags.is_empty() {
                    println!("  {}", terminal::paint(&format!("Tags: {}", note.tags.join(", ")), Color::DIM, use_color));
                }
                for line in note.body.lines() {
                    println!("  {}", line);
                }
                println!("  {}", terminal::paint(&note.id, Color::GRAY, use_color));
                println!();
            }
        }
    }

    Ok(())
}

pub fn run_delete(app: &App, id: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let deleted = app.hub.journal().delete(id).context("Failed to delete note")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": id, "deleted": deleted })),
        OutputFormat::Plain => {
            if deleted {
                println!("Deleted note.");
            } else {
                println!("No note with id {}.", id);
            }
        }
    }

    Ok(())
}

pub fn run_export(app: &App, path: Option<PathBuf>, format: &OutputFormat) -> Result<()> {
    let json = app.hub.journal().export_json().context("Failed to export notes")?;
    let path = app.write_export(path, "notes.json", &json)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
        OutputFormat::Plain => println!("Exported {}", path.display()),
    }

    Ok(())
}
