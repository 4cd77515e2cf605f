use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate, Timelike};
use clap::{ArgGroup, Args, Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

mod coach;
mod db;
mod error;
mod models;
mod pacing;
mod report;
mod rules;
mod stats;
mod upsell;

use error::CoachError;
use models::{CoachingContext, Deal, Tier, TimeOfDay};

#[derive(Parser)]
#[command(name = "carcash-coach")]
#[command(about = "Deal pacing coach and commission tracker for car sales pros", long_about = None)]
struct Cli {
    /// Postgres connection string, required by database-backed commands
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo users and deals dated around today
    Seed,
    /// Import deals from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the coaching message for a time-of-day slot
    Coach {
        #[command(flatten)]
        source: SourceArgs,
        /// morning, midday or evening (defaults to the local clock)
        #[arg(long)]
        slot: Option<TimeOfDay>,
        /// Stamp and store the message (database sources only)
        #[arg(long)]
        save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show the free-tier upgrade banner state
    Upsell {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown coaching report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "coaching-report.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["email", "deals_csv"])
        .required(true)
        .multiple(false)
))]
struct SourceArgs {
    /// Load the user and deals from the database
    #[arg(long)]
    email: Option<String>,
    /// Load deals from a CSV file instead of the database
    #[arg(long)]
    deals_csv: Option<PathBuf>,
    /// Monthly deal goal for CSV sources
    #[arg(long, default_value_t = 20)]
    goal: i64,
    /// Subscription tier for CSV sources
    #[arg(long, default_value = "free")]
    tier: Tier,
}

struct Loaded {
    label: String,
    user_id: Option<Uuid>,
    deals: Vec<Deal>,
    monthly_goal: u32,
    tier: Tier,
}

impl Loaded {
    fn context(&self, today: NaiveDate) -> CoachingContext {
        stats::calculate_coaching_stats(&self.deals, self.monthly_goal, self.tier, today)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let database_url = cli.database_url.as_deref();

    match cli.command {
        Commands::InitDb => {
            let pool = connect(database_url).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(database_url).await?;
            db::seed(&pool, stats::current_snapshot()).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = connect(database_url).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} deals from {}.", csv.display());
        }
        Commands::Coach {
            source,
            slot,
            save,
            json,
        } => {
            let (loaded, pool) = load(&source, database_url).await?;
            let slot = slot.unwrap_or_else(|| TimeOfDay::from_hour(Local::now().hour()));
            let context = loaded.context(stats::current_snapshot());
            let message = coach::generate_coaching_message(&context, slot);
            tracing::info!(
                user = %loaded.label,
                slot = ?slot,
                message_type = message.message_type.as_str(),
                "coaching message generated"
            );

            if save {
                let (Some(pool), Some(user_id)) = (pool.as_ref(), loaded.user_id) else {
                    anyhow::bail!("--save needs a database user (--email)");
                };
                let stamped = message.clone().stamp(user_id);
                db::save_message(pool, &stamped).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&stamped)?);
                    return Ok(());
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&message)?);
            } else {
                println!(
                    "[{} / {}] {}",
                    message.message_type.as_str(),
                    message.level.as_str(),
                    message.text
                );
            }
        }
        Commands::Upsell { source, json } => {
            let (loaded, _) = load(&source, database_url).await?;
            let context = loaded.context(stats::current_snapshot());
            let deal_count = loaded.deals.len() as u32;
            let state = upsell::evaluate_upsell_state(deal_count, context.stats.projected_income());

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else if let Some(banner) = state.banner() {
                println!("{}", banner.title);
                println!("{}", banner.body);
                if let Some(cta) = banner.call_to_action {
                    println!("{cta}");
                }
            } else {
                println!("No upgrade banner at {deal_count} deals.");
            }
        }
        Commands::Report { source, out } => {
            let (loaded, _) = load(&source, database_url).await?;
            let today = stats::current_snapshot();
            let context = loaded.context(today);
            let report =
                report::build_report(&loaded.label, &context, loaded.deals.len() as u32, today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

async fn connect(database_url: Option<&str>) -> anyhow::Result<PgPool> {
    let database_url = database_url.ok_or(CoachError::MissingDatabaseUrl)?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    tracing::debug!("database pool ready");
    Ok(pool)
}

async fn load(
    source: &SourceArgs,
    database_url: Option<&str>,
) -> anyhow::Result<(Loaded, Option<PgPool>)> {
    if let Some(path) = &source.deals_csv {
        let deals = db::read_deals_csv(path)?;
        tracing::debug!(path = %path.display(), count = deals.len(), "loaded deals from csv");
        let loaded = Loaded {
            label: path.display().to_string(),
            user_id: None,
            deals,
            monthly_goal: db::validate_goal(source.goal)?,
            tier: source.tier,
        };
        return Ok((loaded, None));
    }

    let email = source
        .email
        .as_deref()
        .context("either --email or --deals-csv is required")?;
    let pool = connect(database_url).await?;
    let user = db::fetch_user(&pool, email).await?;
    let deals = db::fetch_deals(&pool, user.id).await?;

    let loaded = Loaded {
        label: user.first_name.clone().unwrap_or_else(|| user.email.clone()),
        user_id: Some(user.id),
        deals,
        monthly_goal: user.monthly_goal,
        tier: user.tier,
    };
    Ok((loaded, Some(pool)))
}
