use std::path::PathBuf;

use anyhow::{Context, Result};

use studyhub_lib::backup::BACKUP_FILE_NAME;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, path: Option<PathBuf>, format: &OutputFormat) -> Result<()> {
    let backup = app.hub.export_all();
    let json = serde_json::to_string_pretty(&backup).context("Failed to encode backup")?;
    let path = app.write_export(path, BACKUP_FILE_NAME, &json)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
        OutputFormat::Plain => println!("Exported backup to {}", path.display()),
    }

    Ok(())
}
