//! Seeds sample player stats and checks the dashboard view.
//!
//! Run with:
//! ```
//! cargo run -p matchday-seed --bin seed-player-stats
//! ```
//!
//! Reads `NEXT_PUBLIC_SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` from the
//! environment, `.env.local`, or `.env`. Exits 1 if any step fails.

use std::process::ExitCode;

use clap::Parser;
use matchday_seed::config::{
    BASE_URL_VAR, DEFAULT_USER_EMAIL, SERVICE_KEY_VAR, SeedConfig, USER_EMAIL_VAR, load_dotenv,
};
use matchday_seed::workflow::SeedingWorkflow;
use tracing_subscriber::EnvFilter;

/// Keeps step progress and the dashboard summary on stdout.
const PROGRESS_DIRECTIVE: &str = "matchday_seed=info";

#[derive(Parser, Debug)]
#[command(
    name = "seed-player-stats",
    about = "Seed sample player stats and verify the dashboard view"
)]
struct Args {
    /// Supabase project URL
    #[arg(long, env = BASE_URL_VAR)]
    url: Option<String>,

    /// Service-role key used for every request
    #[arg(long, env = SERVICE_KEY_VAR, hide_env_values = true)]
    service_key: Option<String>,

    /// Email of the user to seed stats for
    #[arg(long, env = USER_EMAIL_VAR, default_value = DEFAULT_USER_EMAIL)]
    email: String,

    /// Only check that the player_stats table exists
    #[arg(long)]
    probe_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Seeding failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the log filter from `RUST_LOG`, defaulting to `info`.
///
/// Progress lines from this crate stay at `info` unless `RUST_LOG` names the
/// crate itself.
fn log_filter() -> EnvFilter {
    let user = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    EnvFilter::new(format!("{PROGRESS_DIRECTIVE},{user}"))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = SeedConfig::resolve(args.url, args.service_key)?.with_user_email(args.email);
    let workflow = SeedingWorkflow::new(&config);

    if args.probe_only {
        workflow.probe().await.into_result()?;
        return Ok(());
    }

    workflow.run().await?;
    Ok(())
}
