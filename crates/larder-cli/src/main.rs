mod calendar_cmd;
mod config;
mod plan_cmd;
mod pools_cmd;
mod session;
mod shopping_cmd;
mod single_cmd;
mod suggest_cmd;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "larder", about = "Weekly meal-plan generator backed by a recipe portal")]
struct Cli {
    /// Portal account email (overrides LARDER_EMAIL and the config file)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Portal country code (overrides LARDER_COUNTRY and the config file)
    #[arg(long, global = true)]
    country: Option<String>,

    /// Portal language tag (overrides LARDER_LANGUAGE and the config file)
    #[arg(long, global = true)]
    language: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a larder config file (credentials placeholder)
    Init {
        /// Portal account email to store
        #[arg(long)]
        email: Option<String>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Load the candidate pools and show their sizes
    Pools {
        /// Print the counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a weekly plan (optionally save it)
    Plan(plan_cmd::PlanArgs),
    /// Draw a single recipe for one slot
    Single(single_cmd::SingleArgs),
    /// Suggest ingredient names for a partial query
    Suggest {
        /// Partial ingredient text (at least 2 characters)
        query: String,
        /// Maximum number of suggestions
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Remove every recipe from a calendar week
    ClearWeek {
        /// Week relative to the current one
        #[arg(long, default_value_t = 0)]
        week_offset: i32,
    },
    /// List the external shopping-service lists
    ShoppingLists,
}

/// Execute the `larder init` command: write the config file skeleton.
fn cmd_init(email: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        portal: config::PortalSection {
            email: email.unwrap_or("you@example.com").to_string(),
            password: std::env::var("LARDER_PASSWORD")
                .unwrap_or_else(|_| "changeme".to_string()),
            country: "de".to_string(),
            language: "de-DE".to_string(),
        },
        shopping: None,
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("Edit it to fill in your portal credentials; the file is chmod 0600.");
    println!("Add a [shopping] section to enable the shopping-list integration.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let portal = || {
        config::resolve_portal(
            cli.email.as_deref(),
            cli.country.as_deref(),
            cli.language.as_deref(),
        )
        .context("could not resolve portal configuration")
    };

    match &cli.command {
        Commands::Init { email, force } => {
            cmd_init(email.as_deref(), *force)?;
        }
        Commands::Pools { json } => {
            pools_cmd::run_pools(&portal()?, *json).await?;
        }
        Commands::Plan(args) => {
            plan_cmd::run_plan(args, &portal()?).await?;
        }
        Commands::Single(args) => {
            single_cmd::run_single(args, &portal()?).await?;
        }
        Commands::Suggest { query, limit } => {
            suggest_cmd::run_suggest(query, *limit, &portal()?).await?;
        }
        Commands::ClearWeek { week_offset } => {
            calendar_cmd::run_clear_week(*week_offset, &portal()?).await?;
        }
        Commands::ShoppingLists => {
            shopping_cmd::run_lists().await?;
        }
    }

    Ok(())
}
