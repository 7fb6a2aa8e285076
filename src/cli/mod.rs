pub mod categories;
pub mod import;
pub mod init;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{MonetaError, Result};
use crate::settings::Settings;

/// Open the configured database, bringing the schema up to date.
pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let db_path = settings.db_path();
    if !db_path.exists() {
        return Err(MonetaError::Other(format!(
            "Database not found at {}. Run `moneta init` first.",
            db_path.display()
        )));
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

/// `--user` wins over the configured default user.
pub(crate) fn resolve_user(settings: &Settings, user: Option<String>) -> String {
    user.unwrap_or_else(|| settings.user_id.clone())
}

#[derive(Parser)]
#[command(name = "moneta", about = "Personal finance tracker with bulk CSV import.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for moneta data (default: ~/Documents/moneta)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Default user to import for
        #[arg(long)]
        user: Option<String>,
    },
    /// Import transactions from a CSV file.
    ///
    /// Expected header: date,amount,description,categoryName[,type][,notes]
    Import {
        /// Path to a .csv file
        file: String,
        /// User to import for (default: configured user)
        #[arg(long)]
        user: Option<String>,
        /// Print the full import result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories.
    Categories {
        #[arg(long)]
        user: Option<String>,
    },
    /// List the most recent transactions.
    Transactions {
        #[arg(long)]
        user: Option<String>,
        /// Maximum rows to show
        #[arg(long, default_value = "50")]
        limit: u32,
    },
    /// Show settings and database summary.
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_prefers_flag() {
        let settings = Settings::default();
        assert_eq!(resolve_user(&settings, Some("alice".to_string())), "alice");
        assert_eq!(resolve_user(&settings, None), "local");
    }

    #[test]
    fn test_parses_import_command() {
        let cli = Cli::try_parse_from(["moneta", "import", "stmt.csv", "--user", "bob", "--json"]).unwrap();
        match cli.command {
            Commands::Import { file, user, json } => {
                assert_eq!(file, "stmt.csv");
                assert_eq!(user.as_deref(), Some("bob"));
                assert!(json);
            }
            _ => panic!("expected import"),
        }
    }
}
