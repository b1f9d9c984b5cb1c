//! Classify command

use colored::Colorize;

use crate::analytics::DeviceDescriptor;
use crate::interfaces::cli::CliError;

pub fn classify_user_agent(user_agent: &str, json: bool) -> Result<(), CliError> {
    let device = DeviceDescriptor::classify(user_agent);

    if json {
        let out = serde_json::to_string_pretty(&device)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{} {}", "type:   ".bold(), device.device_type.to_string().cyan());
    println!("{} {}", "browser:".bold(), device.browser.cyan());
    println!("{} {}", "os:     ".bold(), device.os.cyan());
    Ok(())
}
