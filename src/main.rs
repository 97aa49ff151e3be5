mod browser;
mod cli;
mod client;
mod error;
mod fmt;
mod models;
mod server;
mod settings;
mod sheet;
mod store;
mod tui;
mod validator;
mod workspace;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| settings::load_settings().api_url);

    let result = match cli.command {
        Commands::Check { file } => cli::check::run(&file),
        Commands::Review { file } => cli::review::run(&file, &api_url),
        Commands::Import { file, sheet } => cli::import::run(&file, sheet.as_deref(), &api_url),
        Commands::Records { sheet, page, limit } => cli::records::run(&sheet, page, limit, &api_url),
        Commands::Serve { bind, db } => cli::serve::run(bind.as_deref(), db.as_deref()),
        Commands::Config { bind, data_dir } => cli::config::run(cli.api_url, bind, data_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
