use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{DEFAULT_CATEGORIES, normalize_category_name};
use migration::MigratorTrait;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod categories {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub user_id: String,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "spendbook_admin")]
#[command(about = "Admin utilities for Spendbook (bootstrap users/categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spendbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Category(Category),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user and seed the default categories.
    Create(UserCreateArgs),
    /// Replace the password of an existing user.
    Passwd(UsernameArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Start with an empty category list.
    #[arg(long)]
    no_default_categories: bool,
}

#[derive(Args, Debug)]
struct UsernameArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Add a category for a user.
    Add(CategoryAddArgs),
    /// Add whichever default categories the user is missing.
    Seed(UsernameArgs),
}

#[derive(Args, Debug)]
struct CategoryAddArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    name: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn require_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<users::Model, Box<dyn Error + Send + Sync>> {
    match users::Entity::find_by_id(username.to_string()).one(db).await? {
        Some(user) => Ok(user),
        None => Err(format!("user not found: {username}").into()),
    }
}

/// Inserts each name the user does not already have. Returns how many rows
/// were added.
async fn add_categories<C: ConnectionTrait>(
    db: &C,
    username: &str,
    names: &[&str],
) -> Result<usize, Box<dyn Error + Send + Sync>> {
    let existing: Vec<String> = categories::Entity::find()
        .filter(categories::Column::UserId.eq(username))
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();

    let mut added = 0;
    for name in names {
        let name = normalize_category_name(name)?;
        if existing.contains(&name) {
            continue;
        }
        let category = categories::ActiveModel {
            id: NotSet,
            user_id: Set(username.to_string()),
            name: Set(name),
        };
        categories::Entity::insert(category).exec(db).await?;
        added += 1;
    }
    Ok(added)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;
            println!("created user: {}", args.username);

            if !args.no_default_categories {
                let added = add_categories(&db, &args.username, &DEFAULT_CATEGORIES).await?;
                println!("seeded {added} categories");
            }
        }
        Command::User(User {
            command: UserCommand::Passwd(args),
        }) => {
            let user = require_user(&db, &args.username).await?;
            let password = prompt_password_twice()?;

            let mut user: users::ActiveModel = user.into();
            user.password = Set(password);
            users::Entity::update(user).exec(&db).await?;
            println!("updated password for: {}", args.username);
        }
        Command::Category(Category {
            command: CategoryCommand::Add(args),
        }) => {
            require_user(&db, &args.username).await?;
            let added = add_categories(&db, &args.username, &[args.name.as_str()]).await?;
            if added == 0 {
                eprintln!("category already exists: {}", args.name.trim());
                std::process::exit(1);
            }
            println!("created category: {}", args.name.trim());
        }
        Command::Category(Category {
            command: CategoryCommand::Seed(args),
        }) => {
            require_user(&db, &args.username).await?;
            let added = add_categories(&db, &args.username, &DEFAULT_CATEGORIES).await?;
            println!("seeded {added} categories");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db_with_user(username: &str) -> DatabaseConnection {
        let db = connect_db("sqlite::memory:").await.unwrap();
        users::Entity::insert(users::ActiveModel {
            username: Set(username.to_string()),
            password: Set("pw".to_string()),
        })
        .exec(&db)
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = db_with_user("alice").await;

        assert_eq!(add_categories(&db, "alice", &DEFAULT_CATEGORIES).await.unwrap(), 4);
        assert_eq!(add_categories(&db, "alice", &DEFAULT_CATEGORIES).await.unwrap(), 0);
        assert_eq!(add_categories(&db, "alice", &[" Gym "]).await.unwrap(), 1);

        let count = categories::Entity::find()
            .filter(categories::Column::UserId.eq("alice"))
            .all(&db)
            .await
            .unwrap()
            .len();
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn blank_category_is_rejected() {
        let db = db_with_user("alice").await;
        assert!(add_categories(&db, "alice", &["  "]).await.is_err());
    }

    #[tokio::test]
    async fn missing_user_is_reported() {
        let db = db_with_user("alice").await;
        assert!(require_user(&db, "bob").await.is_err());
        assert!(require_user(&db, "alice").await.is_ok());
    }
}
