use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cubeflow_core::{BuildMode, BuildTarget, CoreError, RunPlan};
use orchestrator::{
    BuildRunner, ConsoleNotifier, Notifier, RunPlanner, RunnerConfig, TelegramNotifier,
};
use sisense::{SisenseClient, TabularExport};
use telegram::TelegramClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_BUILD_TIMEOUT_MINUTES: u64 = 60;
const PREVIEW_ROWS: usize = 25;
const PREVIEW_MAX_CHARS: usize = 3500;

#[derive(Parser)]
#[command(name = "cubeflow")]
#[command(about = "Trigger and babysit remote cube builds", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Base URL of the BI deployment
    #[arg(long, env = "SISENSE_BASE_URL")]
    base_url: String,

    #[arg(long, env = "SISENSE_USER")]
    username: String,

    #[arg(long, env = "SISENSE_PASS", hide_env_values = true)]
    password: String,

    /// Bot token. Omit to log notifications to the console instead.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    chat_id: Option<String>,

    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval_secs: u64,

    #[arg(long, default_value_t = DEFAULT_BUILD_TIMEOUT_MINUTES)]
    build_timeout_minutes: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a declared run plan
    Run {
        /// Path to the TOML plan file
        #[arg(short, long)]
        plan: PathBuf,

        /// Override every loop group's iteration cap for this run
        #[arg(long, env = "MAX_LOOPS_PER_RUN")]
        max_loops: Option<u32>,
    },
    /// Trigger one build and wait for it
    Trigger {
        #[arg(long)]
        datamodel: String,

        /// full, by_table or schema_changes
        #[arg(long, default_value = "full")]
        mode: String,

        #[arg(long)]
        label: Option<String>,
    },
    /// Export a widget's table to the messaging sink as CSV plus preview
    Export {
        #[arg(long, env = "DASHBOARD_ID")]
        dashboard: String,

        #[arg(long, env = "WIDGET_ID")]
        widget: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { ref plan, max_loops } => run(&cli.connection, plan, max_loops).await,
        Commands::Trigger {
            ref datamodel,
            ref mode,
            ref label,
        } => trigger(&cli.connection, datamodel, mode, label.clone()).await,
        Commands::Export {
            ref dashboard,
            ref widget,
        } => export(&cli.connection, dashboard, widget).await,
    }
}

async fn run(conn: &ConnectionArgs, plan_path: &Path, max_loops: Option<u32>) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let notifier = make_notifier(conn);

    let runner = connect(conn, notifier.clone()).await?;
    let report = RunPlanner::new(runner, notifier)
        .with_loop_cap(max_loops)
        .execute(&plan)
        .await?;

    println!("{}", report.summary());
    // Individual build failures are part of the report, not an exit code.
    Ok(())
}

async fn trigger(
    conn: &ConnectionArgs,
    datamodel: &str,
    mode: &str,
    label: Option<String>,
) -> Result<()> {
    let mode =
        BuildMode::parse(mode).ok_or_else(|| CoreError::UnknownBuildMode(mode.to_string()))?;
    let mut target = BuildTarget::new(datamodel, mode);
    if let Some(label) = label {
        target = target.with_label(label);
    }

    let notifier = make_notifier(conn);
    let runner = connect(conn, notifier).await?;

    let outcome = match runner.trigger(&target).await {
        Some(handle) => runner.wait(&target, &handle).await,
        None => cubeflow_core::BuildOutcome::TriggerFailed,
    };
    println!("{}: {}", target.display_name(), outcome);
    Ok(())
}

async fn export(conn: &ConnectionArgs, dashboard: &str, widget: &str) -> Result<()> {
    let (bot_token, chat_id) = match (&conn.bot_token, &conn.chat_id) {
        (Some(token), Some(chat)) => (token.clone(), chat.clone()),
        _ => anyhow::bail!("export requires TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID"),
    };

    let client = SisenseClient::new(&conn.base_url);
    let token = client.login(&conn.username, &conn.password).await?;
    let table = client
        .fetch_widget_table(&token, dashboard, widget)
        .await
        .context("widget export failed")?;

    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    let caption = format!("Widget table {widget} ({now})");

    let sink = TelegramClient::new(bot_token, chat_id);
    sink.send_document("widget_export.csv", table.to_csv().into_bytes(), &caption)
        .await?;
    sink.send_message(&format!(
        "{caption}\n\n{}",
        table.preview(PREVIEW_ROWS, PREVIEW_MAX_CHARS)
    ))
    .await?;

    println!("Exported {} rows from widget {}", table.rows.len(), widget);
    Ok(())
}

async fn connect(conn: &ConnectionArgs, notifier: Arc<dyn Notifier>) -> Result<BuildRunner> {
    let config = RunnerConfig {
        poll_interval: Duration::from_secs(conn.poll_interval_secs),
        build_timeout: Duration::from_secs(conn.build_timeout_minutes * 60),
    };
    let runner = BuildRunner::connect(
        SisenseClient::new(&conn.base_url),
        &conn.username,
        &conn.password,
        config,
        notifier,
    )
    .await?;
    Ok(runner)
}

fn make_notifier(conn: &ConnectionArgs) -> Arc<dyn Notifier> {
    match (&conn.bot_token, &conn.chat_id) {
        (Some(token), Some(chat)) => Arc::new(TelegramNotifier::new(TelegramClient::new(
            token.clone(),
            chat.clone(),
        ))),
        _ => {
            tracing::info!("No bot configured, notifications go to the console");
            Arc::new(ConsoleNotifier)
        }
    }
}

fn load_plan(path: &Path) -> Result<RunPlan> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {}", path.display()))?;
    let plan: RunPlan = toml::from_str(&content)
        .with_context(|| format!("failed to parse plan file {}", path.display()))?;
    plan.validate()?;
    Ok(plan)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cubeflow=info,orchestrator=info,sisense=info,telegram=info".into()),
        )
        .init();
}
