use anyhow::Result;

use studyhub_lib::certs::cert_title;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let summary = app.hub.activity().summary();
    let current_cert = app.hub.settings().get().current_cert;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "currentCert": current_cert,
                "summary": summary,
            }))?);
        }
        OutputFormat::Plain => {
            let days = |n: u32| if n == 1 { "day" } else { "days" };
            println!("Current certification: {}", terminal::paint(cert_title(&current_cert), Color::BOLD, use_color));
            println!(
                "Streak:         {} {}",
                terminal::paint(&summary.streak_days.to_string(), Color::GREEN, use_color),
                days(summary.streak_days)
            );
            println!("Longest streak: {} {}", summary.longest_streak, days(summary.longest_streak));
            println!("Today:          {} min", summary.today_minutes);
            println!("Last 7 days:    {} min", summary.week_minutes);
            println!("Entries:        {}", summary.total_entries);
        }
    }

    Ok(())
}
