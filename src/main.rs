mod category_resolver;
mod cli;
mod db;
mod dedup;
mod error;
mod fmt;
mod importer;
mod logging;
mod models;
mod parser;
mod settings;
mod store;
#[cfg(test)]
mod testing;
mod validator;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, user } => cli::init::run(data_dir, user),
        Commands::Import { file, user, json } => cli::import::run(&file, user, json),
        Commands::Categories { user } => cli::categories::list(user),
        Commands::Transactions { user, limit } => cli::transactions::list(user, limit),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
