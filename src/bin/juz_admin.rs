use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use juz_tracker::{
    auth::issue_session_token,
    config::{AppConfig, ConfigLoader},
    db,
    repositories::OrganizationRepository,
    telemetry,
    tracker::OrganizationId,
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "juz-admin")]
#[command(about = "Operator tasks for the Juz tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations (seeds the chapter catalog)
    Migrate,
    /// Create an organization, optionally with a first member
    CreateOrganization {
        #[arg(long)]
        name: String,
        /// Identity-provider user id to add as member
        #[arg(long)]
        member: Option<Uuid>,
    },
    /// Attach a user to an existing organization
    AddMember {
        #[arg(long)]
        organization: Uuid,
        #[arg(long)]
        user: Uuid,
    },
    /// Mint a session token for local testing (local and test profiles only)
    IssueToken {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = 3600)]
        ttl_seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config)?;

    match cli.command {
        Commands::Migrate => {
            let db = connect(&config).await?;
            db::run_migrations(&db).await?;
            println!("Migrations applied.");
        }
        Commands::CreateOrganization { name, member } => {
            let db = connect(&config).await?;
            let organizations = OrganizationRepository::new(&db);
            let organization = match member {
                Some(user_id) => organizations.create_for_user(&name, user_id).await,
                None => organizations.create(&name).await,
            }
            .context("creating organization")?;
            println!("{}", organization.id);
        }
        Commands::AddMember { organization, user } => {
            let db = connect(&config).await?;
            OrganizationRepository::new(&db)
                .add_member(OrganizationId(organization), user)
                .await
                .context("adding member")?;
            println!("User {user} added to organization {organization}.");
        }
        Commands::IssueToken {
            user,
            email,
            ttl_seconds,
        } => {
            if !config.is_local_profile() {
                bail!(
                    "refusing to mint tokens for profile '{}'; use the identity service",
                    config.profile
                );
            }
            let token = issue_session_token(
                &config,
                user,
                email.as_deref(),
                Duration::from_secs(ttl_seconds),
            )
            .context("signing session token")?;
            println!("{token}");
        }
    }

    Ok(())
}

async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    db::init_pool(config)
        .await
        .context("initializing database connection pool")
}
