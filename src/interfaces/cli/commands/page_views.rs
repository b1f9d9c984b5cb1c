//! Stats / record commands

use colored::Colorize;

use crate::analytics::{MAX_PATH_LEN, PageView, is_trackable_path};
use crate::interfaces::cli::CliError;
use crate::services::AnalyticsService;

pub async fn show_stats(service: &AnalyticsService, json: bool) -> Result<(), CliError> {
    let stats = service.try_get_analytics_stats().await?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if stats.top_pages.is_empty() {
        println!("{} No page views recorded yet", "ℹ".bold().blue());
        return Ok(());
    }

    let width = stats
        .top_pages
        .iter()
        .map(|p| p.path.len())
        .max()
        .unwrap_or(0);
    for (rank, page) in stats.top_pages.iter().enumerate() {
        println!(
            "{:>3}. {}  {}",
            rank + 1,
            format!("{:<width$}", page.path).cyan(),
            page.page_views.to_string().yellow()
        );
    }
    println!(
        "{} {} views across the top {} pages",
        "Σ".bold(),
        stats.total_views.to_string().green(),
        stats.top_pages.len()
    );
    Ok(())
}

pub async fn record_view(
    service: &AnalyticsService,
    path: String,
    referrer: Option<String>,
    user_agent: Option<String>,
) -> Result<(), CliError> {
    if !is_trackable_path(&path) {
        return Err(CliError::ParseError(format!(
            "path must start with '/' and be at most {} characters: {}",
            MAX_PATH_LEN, path
        )));
    }

    service
        .try_record_page_view(PageView::new(path.clone(), referrer, user_agent))
        .await?;

    println!("{} Recorded page view: {}", "✓".bold().green(), path.cyan());
    Ok(())
}
