use std::{ops::ControlFlow, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, load_settings_from},
    BackendShape, ControllerEvent, FetchOutcome, HttpMovieStore, MovieController, Settings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;
mod orchestration;
mod render;

use commands::parse_command;
use orchestration::dispatch_command;
use render::render_view;

#[derive(Parser, Debug)]
#[command(name = "movies", about = "Browse and edit a remote movie list")]
struct Args {
    /// Base URL of the document store (the collection lives at <base>/movies.json).
    #[arg(long)]
    base_url: Option<String>,
    /// Response shape of the backend: firebase or swapi.
    #[arg(long)]
    shape: Option<BackendShape>,
    #[arg(long)]
    retry_period_ms: Option<u64>,
    /// 0 retries until success or cancel.
    #[arg(long)]
    retry_max_attempts: Option<u32>,
    /// Settings file; defaults to ./movies.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fetch once, print the list and exit.
    #[arg(long)]
    once: bool,
}

fn resolve_settings(args: &Args) -> Settings {
    let mut settings = match &args.config {
        Some(path) => load_settings_from(path, |key| std::env::var(key).ok()),
        None => load_settings(),
    };
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(shape) = args.shape {
        settings.backend_shape = shape;
    }
    if let Some(period) = args.retry_period_ms.filter(|period| *period > 0) {
        settings.retry_period_ms = period;
    }
    if let Some(max_attempts) = args.retry_max_attempts {
        settings.retry_max_attempts = (max_attempts > 0).then_some(max_attempts);
    }
    settings
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = resolve_settings(&args);
    tracing::info!(
        base_url = %settings.base_url,
        shape = %settings.backend_shape,
        retry_period_ms = settings.retry_period_ms,
        "starting movie client"
    );

    let store = HttpMovieStore::from_settings(&settings)
        .with_context(|| format!("failed to configure store at '{}'", settings.base_url))?;
    let controller = MovieController::new(Arc::new(store), settings.retry_policy());

    if args.once {
        let outcome = controller.mount().await;
        print!("{}", render_view(&controller.view().await));
        controller.shutdown().await;
        return match outcome {
            FetchOutcome::Failed(err) => Err(err).context("failed to fetch movies"),
            _ => Ok(()),
        };
    }

    let render_task = spawn_renderer(&controller);
    {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller.mount().await;
        });
    }

    println!("{}", commands::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read from stdin")?
    {
        match parse_command(&line) {
            Ok(Some(command)) => {
                if let ControlFlow::Break(()) = dispatch_command(&controller, command).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }

    controller.shutdown().await;
    render_task.abort();
    Ok(())
}

/// Prints the view whenever it changes.
fn spawn_renderer(controller: &Arc<MovieController>) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        let mut last_rendered = String::new();
        loop {
            match events.recv().await {
                Ok(ControllerEvent::StateChanged(view)) => {
                    let rendered = render_view(&view);
                    if rendered != last_rendered {
                        print!("{rendered}");
                        last_rendered = rendered;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "renderer lagged behind controller events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
