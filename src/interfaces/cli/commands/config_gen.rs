//! Generate config command

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

const DEFAULT_OUTPUT_PATH: &str = "config.example.toml";

/// Generate example configuration file
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

    // 非 --force 模式下覆盖已有文件需要确认
    if !force && Path::new(&path).exists() {
        print!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite? [y/N] ".yellow()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    StaticConfig::default().save_to_file(&path)?;
    println!(
        "{} Configuration file generated: {}",
        "✓".bold().green(),
        path.blue()
    );
    println!(
        "  {} {}",
        "Environment overrides use the BP__ prefix, e.g.".dimmed(),
        "BP__SERVER__PORT=9000".cyan()
    );
    Ok(())
}
