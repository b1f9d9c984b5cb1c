use clap::Parser;
use colored::Colorize;

use blogpulse::cli::{Cli, Commands};
use blogpulse::config::{get_config, init_config_from};
use blogpulse::runtime::modes;
use blogpulse::system::init_logging;

#[actix_web::main]
async fn main() {
    // .env 先于配置加载，BP__* 变量可以写在里面
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref());
    let config = get_config();

    match cli.command {
        None | Some(Commands::Serve) => {
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server(&config).await {
                tracing::error!("Server exited with error: {:#}", e);
                eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
                std::process::exit(1);
            }
        }
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd, &config).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }
}
