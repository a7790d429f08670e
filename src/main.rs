mod api;
mod app;
mod config;
mod error;
mod model;
mod tasks;
mod theme;
mod ui;

use anyhow::{anyhow, bail, Result};
use api::http::HttpTaskApi;
use api::worker::ApiWorker;
use api::TaskApi;
use app::App;
use chrono::Utc;
use config::AppConfig;
use error::Operation;
use model::DisplayMode;
use std::sync::Arc;
use tasks::{countdown, filter_tasks};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "\
usage:
  tb                            interactive task board
  tb lists                      print all lists
  tb tasks <listId> [todo|done] print a list's tasks (default: todo)
  tb show <listId> <taskId>     print one task";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let rest = args.get(2..).unwrap_or_default();

    match args.get(1).map(|s| s.as_str()) {
        None          => run_tui().await,
        Some("lists") => cmd_lists().await,
        Some("tasks") => cmd_tasks(rest).await,
        Some("show")  => cmd_show(rest).await,
        Some(_)       => { println!("{USAGE}"); Ok(()) }
    }
}

/// Default `RUST_LOG` levels. Subcommands stay quiet on stderr so their
/// stdout can be piped.
const CLI_LOG_LEVEL: &str = "warn";
const TUI_LOG_LEVEL: &str = "info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logging to stderr so it doesn't interfere with command output.
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(env_filter(CLI_LOG_LEVEL))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn connect() -> Result<HttpTaskApi> {
    let cfg = AppConfig::load()?;
    if cfg.api.token.is_empty() {
        tracing::warn!(
            "no API token; set TASKBOARD_TOKEN or [api].token in {}",
            config::config_path().display()
        );
    }
    Ok(HttpTaskApi::new(&cfg.api)?)
}

// ─── One-shot commands ────────────────────────────────────────────────────────

async fn cmd_lists() -> Result<()> {
    init_cli_logging();
    let api   = connect()?;
    let lists = api.list_collections().await
        .map_err(|e| anyhow!(Operation::FetchLists.failure_message(&e)))?;
    for list in lists {
        println!("{}\t{}", list.id, list.title);
    }
    Ok(())
}

async fn cmd_tasks(args: &[String]) -> Result<()> {
    init_cli_logging();
    let Some(list_id) = args.first() else { bail!("{USAGE}") };
    let mode = match args.get(1) {
        None    => DisplayMode::Todo,
        Some(m) => DisplayMode::parse(m).ok_or_else(|| anyhow!("unknown mode {m:?}, expected todo or done"))?,
    };

    let api   = connect()?;
    let tasks = api.tasks_for(list_id).await
        .map_err(|e| anyhow!(Operation::FetchTasks.failure_message(&e)))?;
    let now = Utc::now();
    for task in filter_tasks(&tasks, mode) {
        println!("{}\t{}\t{}\t{}", task.id, mode.label(), task.title, ui::due_summary(task, now));
    }
    Ok(())
}

async fn cmd_show(args: &[String]) -> Result<()> {
    init_cli_logging();
    let (Some(list_id), Some(task_id)) = (args.first(), args.get(1)) else { bail!("{USAGE}") };

    let api  = connect()?;
    let task = api.task(list_id, task_id).await
        .map_err(|e| anyhow!(Operation::FetchTask.failure_message(&e)))?;
    let remaining = countdown::format_remaining(task.limit.as_deref(), Utc::now())
        .unwrap_or_else(|e| e.to_string());

    println!("id:        {}", task.id);
    println!("title:     {}", task.title);
    println!("status:    {}", if task.done { "done" } else { "todo" });
    println!("due:       {}", task.limit.as_deref().unwrap_or("-"));
    println!("remaining: {remaining}");
    if !task.detail.is_empty() {
        println!("\n{}", task.detail);
    }
    Ok(())
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

async fn run_tui() -> Result<()> {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("taskboard");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "taskboard.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(env_filter(TUI_LOG_LEVEL))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Starting taskboard");

    let cfg = AppConfig::load()?;
    if cfg.api.token.is_empty() {
        tracing::warn!("no API token configured; requests will likely be rejected");
    }
    let api    = Arc::new(HttpTaskApi::new(&cfg.api)?);
    let worker = ApiWorker::spawn(api);

    let mut app = App::new(worker, cfg.theme);
    app.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn log_defaults_per_surface() {
        assert_eq!(EnvFilter::new(CLI_LOG_LEVEL).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(EnvFilter::new(TUI_LOG_LEVEL).max_level_hint(), Some(LevelFilter::INFO));
    }
}
