mod config;
mod script;

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use player_core::{ScreenDependencies, ScriptedExplorationProgress, StateScreenPresenter};
use storage::{InMemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore};

#[derive(Parser, Debug)]
struct Args {
    /// Lesson script to replay against the state screen.
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long, default_value = "player.toml")]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    display_density: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(&args.config);
    if let Some(url) = args.database_url {
        settings.database_url = Some(url);
    }
    if let Some(density) = args.display_density {
        settings.display_density = density;
    }
    if let Some(script) = args.script {
        settings.lesson_script = Some(script);
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let script_path = settings
        .lesson_script
        .clone()
        .ok_or_else(|| anyhow!("no lesson script given, pass --script or set lesson_script"))?;
    let lesson = script::load_script(&script_path)?;
    let density = settings.density()?;

    let store: Arc<dyn PreferenceStore> = match &settings.database_url {
        Some(url) => {
            let store = SqlitePreferenceStore::new(url)
                .await
                .with_context(|| format!("failed to open preference store at {url}"))?;
            if lesson.initial_preference.is_some() {
                tracing::warn!("database configured, ignoring the script's initial preference");
            }
            Arc::new(store)
        }
        None => Arc::new(InMemoryPreferenceStore::with_snapshot(
            lesson.initial_preference.unwrap_or_default(),
        )),
    };

    let source = ScriptedExplorationProgress::new();
    let mut presenter = StateScreenPresenter::new(
        ScreenDependencies::new(store, Arc::new(source.clone())).with_density(density),
    );
    let mut subscriptions = presenter.handle_create_view()?;
    tracing::info!(
        script = %script_path.display(),
        steps = lesson.steps.len(),
        "replaying lesson"
    );

    let mut stdout = io::stdout().lock();
    script::replay(&lesson, &mut presenter, &source, &mut subscriptions, &mut stdout).await?;

    drop(subscriptions);
    presenter.flush_pending_writes().await;
    tracing::info!("lesson replay finished");
    Ok(())
}
