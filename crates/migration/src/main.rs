use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "hospital_migrate")]
#[command(about = "Schema migrations of the hospital fund ledger store")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./hospital_ledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Apply pending migrations (the default).
    Up {
        /// Apply at most this many.
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations.
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and re-apply all migrations.
    Fresh,
    /// List applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            migration::Migrator::up(&db, steps).await?;
            println!("ledger schema is up to date");
        }
        Command::Down { steps } => {
            migration::Migrator::down(&db, Some(steps)).await?;
            println!("rolled back {steps} migration(s)");
        }
        Command::Fresh => {
            migration::Migrator::fresh(&db).await?;
            println!("ledger schema recreated");
        }
        Command::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_up() {
        let cli = Cli::try_parse_from(["hospital_migrate", "--database-url", "sqlite::memory:"])
            .unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.database_url, "sqlite::memory:");
    }

    #[test]
    fn down_rolls_back_one_step_by_default() {
        let cli = Cli::try_parse_from(["hospital_migrate", "down"]).unwrap();
        assert_eq!(cli.command, Some(Command::Down { steps: 1 }));

        let cli = Cli::try_parse_from(["hospital_migrate", "up", "--steps", "1"]).unwrap();
        assert_eq!(cli.command, Some(Command::Up { steps: Some(1) }));

        assert!(Cli::try_parse_from(["hospital_migrate", "sideways"]).is_err());
    }
}
