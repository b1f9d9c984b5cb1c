//! CLI mode

use crate::cli::Commands;
use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

/// Run CLI mode
pub async fn run_cli(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    crate::interfaces::cli::run_cli_command(cmd, config).await
}
