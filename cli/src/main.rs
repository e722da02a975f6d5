use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use lesson_ledger::Config;
use lesson_ledger::auth::{CryptError, UserClaims, generate_token};
use lesson_ledger::error::AppResult;
use lesson_ledger::model::entity::{UserRecord, UserRecordCreate};
use lesson_ledger::model::{DbConnection, ModelManager, PgUserStore};
use lesson_ledger::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for operating the lesson ledger", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue tokens signed with the configured `auth.secret`
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// Inspect and seed user records
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    Issue {
        /// Subject, becomes the user id
        #[arg(long)]
        sub: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Show {
        #[arg(long)]
        id: String,
    },
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

fn connect(config: &Config) -> AppResult<ModelManager> {
    // DATABASE_URL wins so the tool can target another database than the service
    let uri = std::env::var("DATABASE_URL").unwrap_or_else(|_| config.app().database_uri().to_string());
    let db = DbConnection::connect(&uri)?;
    Ok(ModelManager::new(PgUserStore::new(db)))
}

fn print_json(record: &UserRecord) -> AppResult<()> {
    let out = serde_json::to_string_pretty(record)?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    let config = Config::load(cfg!(debug_assertions))?;

    match args.command {
        Commands::Token { action } => match action {
            TokenCommands::Issue { sub, email, hours } => {
                let secret = config.auth().secret().ok_or(CryptError::MissingKey)?;
                let claims = UserClaims {
                    sub,
                    exp: (Utc::now() + Duration::hours(hours)).timestamp(),
                    email,
                };
                let token = generate_token(claims, secret).map_err(CryptError::JwtError)?;
                println!("{token}");
            }
        },

        Commands::User { action } => {
            let mm = connect(&config)?;
            match action {
                UserCommands::Show { id } => {
                    let actor = AuthenticatedUser::new(id.clone(), None);
                    match UserRecord::find_by_id(&mm, &actor, &id).await? {
                        Some(record) => print_json(&record)?,
                        None => eprintln!("no record for user `{id}`"),
                    }
                }
                UserCommands::Create { id, email, avatar } => {
                    let actor = AuthenticatedUser::new(id, None);
                    let record =
                        UserRecord::create(&mm, &actor, UserRecordCreate::new(&actor, email, avatar))
                            .await?;
                    print_json(&record)?;
                }
            }
        }
    }

    Ok(())
}
