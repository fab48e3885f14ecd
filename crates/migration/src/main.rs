//! Schema runner for the Spendbook database.
//!
//! `DATABASE_URL` selects the database; the first argument picks the action.

use migration::Migrator;
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./spendbook.db?mode=rwc";

enum Action {
    Up,
    Down,
    Fresh,
    Status,
}

fn parse_action(raw: Option<&str>) -> Option<Action> {
    match raw.unwrap_or("up") {
        "up" => Some(Action::Up),
        "down" => Some(Action::Down),
        "fresh" => Some(Action::Fresh),
        "status" => Some(Action::Status),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let arg = std::env::args().nth(1);
    let Some(action) = parse_action(arg.as_deref()) else {
        eprintln!("Usage: migration [up|down|fresh|status]");
        std::process::exit(2);
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match action {
        Action::Up => Migrator::up(&db, None).await?,
        Action::Down => Migrator::down(&db, None).await?,
        Action::Fresh => Migrator::fresh(&db).await?,
        Action::Status => Migrator::status(&db).await?,
    }

    Ok(())
}
