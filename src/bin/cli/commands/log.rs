use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use studyhub_lib::activity::{ActivityEntry, ActivityFilter, ActivityKind, StudyLogForm};
use studyhub_lib::certs::cert_title;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub struct AddArgs {
    pub cert: Option<String>,
    pub kind: String,
    pub minutes: u32,
    pub title: Option<String>,
    pub did: Option<String>,
    pub learned: Option<String>,
    pub next: Option<String>,
    pub tags: Option<String>,
    pub at: Option<String>,
}

pub struct ListArgs {
    pub cert: Option<String>,
    pub kind: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub limit: usize,
}

fn parse_day(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", v)))
        .transpose()
}

pub fn run_add(app: &App, args: AddArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cert_id = app.resolve_cert(args.cert.as_deref())?;
    let timestamp = args
        .at
        .as_deref()
        .map(|at| {
            DateTime::parse_from_rfc3339(at)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Invalid timestamp '{}', expected RFC 3339", at))
        })
        .transpose()?;

    let form = StudyLogForm {
        timestamp,
        cert_id,
        kind: Some(ActivityKind::from(args.kind.trim())),
        minutes: args.minutes,
        title: args.title.unwrap_or_default(),
        did: args.did.unwrap_or_default(),
        learned: args.learned.unwrap_or_default(),
        next: args.next.unwrap_or_default(),
        tags: args.tags.unwrap_or_default(),
    };

    let entry = match app.hub.activity().log_study(form) {
        Ok(entry) => entry,
        Err(e) if e.is_rejection() => {
            terminal::notice(&e.to_string(), use_color);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to log entry"),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
        OutputFormat::Plain => {
            println!("Logged. {}", terminal::paint(&entry.id, Color::GRAY, use_color));
        }
    }

    Ok(())
}

pub fn run_list(app: &App, args: ListArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cert_id = args.cert.as_deref().map(|c| app.resolve_cert(Some(c))).transpose()?;
    let filter = ActivityFilter {
        cert_id,
        kind: args.kind.as_deref().map(ActivityKind::from),
        from_day: parse_day(args.from.as_deref())?,
        to_day: parse_day(args.to.as_deref())?,
        query: args.search,
    };

    let entries: Vec<ActivityEntry> = app.hub.activity().search(&filter).into_iter().take(args.limit).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No entries match your filters.");
                return Ok(());
            }

            for entry in &entries {
                let heading = format!(
                    "[{}] {} - {} min - {}",
                    cert_title(&entry.cert_id),
                    entry.kind,
                    entry.minutes,
                    entry.title
                );
                let when = entry.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M");
                println!(
                    "{}  {}",
                    terminal::paint(heading.trim_end_matches(" - "), Color::BOLD, use_color),
                    terminal::paint(&when.to_string(), Color::DIM, use_color)
                );
                if !entry.details.is_empty() {
                    println!("  {}", entry.details);
                }
                let tags = entry.tags();
                if !tags.is_empty() {
                    println!("  {}", terminal::paint(&format!("Tags: {}", tags.join(", ")), Color::DIM, use_color));
                }
                println!("  {}", terminal::paint(&entry.id, Color::GRAY, use_color));
            }

            println!("\n{} entries shown", entries.len());
        }
    }

    Ok(())
}

pub fn run_delete(app: &App, id: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let deleted = app.hub.activity().delete(id).context("Failed to delete entry")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": id, "deleted": deleted })),
        OutputFormat::Plain => {
            if deleted {
                println!("Deleted entry.");
            } else {
                println!("No entry with id {}.", id);
            }
        }
    }

    Ok(())
}

pub fn run_clear(app: &App, yes: bool, format: &OutputFormat, _use_color: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to clear the activity log without --yes");
    }
    app.hub.activity().clear().context("Failed to clear activity log")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "cleared": true })),
        OutputFormat::Plain => println!("Cleared activity log."),
    }

    Ok(())
}

pub fn run_export(app: &App, path: Option<PathBuf>, format: &OutputFormat) -> Result<()> {
    let json = app.hub.activity().export_json().context("Failed to export activity log")?;
    let path = app.write_export(path, "activity.json", &json)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
        OutputFormat::Plain => println!("Exported {}", path.display()),
    }

    Ok(())
}
