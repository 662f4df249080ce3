//! Applies or inspects the pennywise schema.
//!
//! `DATABASE_URL` overrides the default on-disk database.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./pennywise.db?mode=rwc";
const USAGE: &str =
    "Usage: migration [up|down|fresh|status]  (pennywise schema; DATABASE_URL overrides the default)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Up,
    Down,
    Fresh,
    Status,
}

/// No argument means `up`.
fn parse_command(arg: Option<&str>) -> Option<Command> {
    match arg.unwrap_or("up") {
        "up" => Some(Command::Up),
        "down" => Some(Command::Down),
        "fresh" => Some(Command::Fresh),
        "status" => Some(Command::Status),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let arg = std::env::args().nth(1);
    let Some(command) = parse_command(arg.as_deref()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match command {
        Command::Up => migration::Migrator::up(&db, None).await?,
        Command::Down => migration::Migrator::down(&db, None).await?,
        Command::Fresh => migration::Migrator::fresh(&db).await?,
        Command::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_up() {
        assert_eq!(parse_command(None), Some(Command::Up));
        assert_eq!(parse_command(Some("status")), Some(Command::Status));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(parse_command(Some("refresh")), None);
        assert_eq!(parse_command(Some("UP")), None);
    }
}
