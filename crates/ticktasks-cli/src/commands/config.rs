//! Settings: retention days and theme.

use anyhow::{Context, Result};
use ticktasks_core::{RetentionScheduler, Theme};
use tracing::debug;

use super::open;

pub async fn run(days: Option<u32>, theme: Option<String>) -> Result<()> {
    debug!("config command: days={:?}, theme={:?}", days, theme);
    let (settings, service) = open().await?;

    let theme = theme
        .map(|t| t.parse::<Theme>().map_err(anyhow::Error::msg))
        .transpose()
        .context("Invalid --theme")?;

    if days.is_none() && theme.is_none() {
        let config = settings.snapshot().await;
        println!("Auto-delete after:  {} day(s)", config.retention.auto_delete_days);
        println!("Cleanup interval:   {} hour(s)", config.retention.interval_hours);
        println!(
            "Theme:              {:?} ({})",
            config.display.theme,
            config.display.theme.index()
        );
        if let Some(path) = settings.path() {
            println!("Config file:        {}", path.display());
        }
        return Ok(());
    }

    let config = settings
        .update(|c| {
            if let Some(days) = days {
                c.retention.auto_delete_days = days;
            }
            if let Some(theme) = theme {
                c.display.theme = theme;
            }
        })
        .await?;

    println!("\u{2713} Settings saved");
    println!("  Auto-delete after {} day(s)", config.retention.auto_delete_days);
    println!("  Theme: {:?}", config.display.theme);

    // Saving settings always re-registers the cleanup cadence.
    let scheduler = RetentionScheduler::new(service, settings);
    let schedule = scheduler.schedule().await?;
    println!(
        "  Cleanup re-scheduled every {} hour(s)",
        schedule.interval_secs / 3600
    );
    Ok(())
}
