use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use studyhub_lib::certs::{cert_title, CERTIFICATIONS};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let current = app.hub.settings().get().current_cert;
    let certs = app.hub.certs();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = CERTIFICATIONS.iter().map(|c| {
                let data = certs.get(c.id);
                serde_json::json!({
                    "id": c.id,
                    "title": c.title,
                    "isCurrent": c.id == current,
                    "sessions": data.sessions.len(),
                    "minutes": data.total_minutes(),
                    "objectivesDone": data.objectives_done(),
                    "objectives": data.objectives.len(),
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for c in CERTIFICATIONS {
                let data = certs.get(c.id);
                let marker = if c.id == current { "* " } else { "  " };
                println!(
                    "{}{} {:<8} {:>4} sessions {:>6} min  objectives {}/{}",
                    marker,
                    terminal::paint(&format!("{:<12}", c.title), Color::BOLD, use_color),
                    c.id,
                    data.sessions.len(),
                    data.total_minutes(),
                    data.objectives_done(),
                    data.objectives.len()
                );
            }
        }
    }

    Ok(())
}

pub fn run_show(app: &App, cert: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let data = app.hub.certs().get(&cert_id);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Plain => {
            println!("{}", terminal::paint(cert_title(&cert_id), Color::BOLD, use_color));
            println!(
                "{}",
                terminal::paint(
                    &format!("Updated {}", data.updated_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")),
                    Color::DIM,
                    use_color
                )
            );

            println!("\nObjectives ({}/{} done)", data.objectives_done(), data.objectives.len());
            for (i, objective) in data.objectives.iter().enumerate() {
                let check = if objective.done { "[x]" } else { "[ ]" };
                println!("  {:>3}. {} {}", i + 1, check, objective.text);
            }

            println!("\nSessions ({} min total)", data.total_minutes());
            for session in data.sessions.iter().take(10) {
                println!(
                    "  {}  {:>4} min  {}  {}",
                    session.ts.with_timezone(&chrono::Local).format("%Y-%m-%d"),
                    session.minutes,
                    session.topic,
                    terminal::paint(&session.id, Color::GRAY, use_color)
                );
            }
            if data.sessions.len() > 10 {
                println!("  ... {} more", data.sessions.len() - 10);
            }

            if !data.notes.is_empty() {
                println!("\nNotes");
                for line in data.notes.lines() {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}

pub fn run_notes(app: &App, cert: &str, text: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    app.hub.certs().set_notes(&cert_id, text).context("Failed to save notes")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "certId": cert_id, "saved": true })),
        OutputFormat::Plain => println!("Saved notes for {}.", cert_title(&cert_id)),
    }

    Ok(())
}

pub fn run_session(
    app: &App,
    cert: &str,
    topic: Option<&str>,
    minutes: u32,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let session = match app.hub.certs().add_session(&cert_id, topic.unwrap_or_default(), minutes) {
        Ok(session) => session,
        Err(e) if e.is_rejection() => {
            terminal::notice(&e.to_string(), use_color);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to log session"),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
        OutputFormat::Plain => println!(
            "Logged {} min of {} for {}. {}",
            session.minutes,
            session.topic,
            cert_title(&cert_id),
            terminal::paint(&session.id, Color::GRAY, use_color)
        ),
    }

    Ok(())
}

pub fn run_session_delete(app: &App, cert: &str, id: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let deleted = app.hub.certs().delete_session(&cert_id, id).context("Failed to delete session")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": id, "deleted": deleted })),
        OutputFormat::Plain => {
            if deleted {
                println!("Deleted session.");
            } else {
                println!("No session with id {}.", id);
            }
        }
    }

    Ok(())
}

pub fn run_objectives(app: &App, cert: &str, text: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let data = app.hub.certs().replace_objectives(&cert_id, text).context("Failed to save objectives")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data.objectives)?),
        OutputFormat::Plain => println!("Saved {} objectives for {}.", data.objectives.len(), cert_title(&cert_id)),
    }

    Ok(())
}

/// Objectives are numbered from 1 on the command line
fn objective_index(number: usize) -> Result<usize> {
    if number == 0 {
        bail!("Objective numbers start at 1");
    }
    Ok(number - 1)
}

pub fn run_set_done(
    app: &App,
    cert: &str,
    number: usize,
    done: bool,
    format: &OutputFormat,
    _use_color: bool,
) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let updated = app
        .hub
        .certs()
        .set_objective_done(&cert_id, objective_index(number)?, done)
        .context("Failed to update objective")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "number": number, "done": done, "updated": updated })),
        OutputFormat::Plain => {
            if updated {
                println!("Objective {} marked {}.", number, if done { "done" } else { "not done" });
            } else {
                println!("No objective {}.", number);
            }
        }
    }

    Ok(())
}

pub fn run_remove_objective(app: &App, cert: &str, number: usize, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let removed = app
        .hub
        .certs()
        .remove_objective(&cert_id, objective_index(number)?)
        .context("Failed to remove objective")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "number": number, "removed": removed })),
        OutputFormat::Plain => {
            if removed {
                println!("Removed objective {}.", number);
            } else {
                println!("No objective {}.", number);
            }
        }
    }

    Ok(())
}

pub fn run_export(app: &App, cert: &str, path: Option<PathBuf>, format: &OutputFormat) -> Result<()> {
    let cert_id = app.resolve_cert(Some(cert))?;
    let export = app.hub.certs().export(&cert_id);
    let json = serde_json::to_string_pretty(&export)?;
    let path = app.write_export(path, &format!("{}_data.json", cert_id), &json)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
        OutputFormat::Plain => println!("Exported {}", path.display()),
    }

    Ok(())
}
