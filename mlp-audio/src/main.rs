//! Micro-lesson player (mlp-audio) - Main entry point
//!
//! Thin demo driver around the playback controller: plays a lesson's main
//! line through the simulated speech engine until the reveal gate opens,
//! logging every playback event as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mlp_audio::{PlaybackController, PlayerConfig};
use mlp_common::AudioClip;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mlp-audio
#[derive(Parser, Debug)]
#[command(name = "mlp-audio")]
#[command(about = "Audio playback and reveal-gate demo for the micro-lesson player")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "MLP_CONFIG")]
    config: Option<PathBuf>,

    /// Main-line utterance text to synthesize
    #[arg(short, long, default_value = "Hola, buenos dias", env = "MLP_LESSON_TEXT")]
    lesson_text: String,

    /// Language tag for synthesis
    #[arg(long, default_value = "es-MX", env = "MLP_LANGUAGE")]
    language: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mlp_audio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PlayerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PlayerConfig::default(),
    };

    info!("Starting micro-lesson player (engine: {})", config.engine);

    let main_line_id = config.default_main_line_id.clone();
    let controller = Arc::new(
        PlaybackController::with_default_engine(config)
            .context("Failed to initialize playback controller")?,
    );
    Arc::clone(&controller).start();

    // Log the full event stream as JSON, telemetry-sink style
    let mut events = controller.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => info!("event: {}", json),
                Err(e) => tracing::warn!("Failed to serialize event: {}", e),
            }
        }
    });

    let clip = AudioClip::synthesized(&main_line_id, &args.lesson_text, &args.language, 2.0, 1.0);

    // Play the main line until the gate opens, watching completions
    let mut watcher = controller.events();
    while !controller.current_state().can_reveal {
        controller
            .play_audio(&clip)
            .context("Failed to start playback")?;

        loop {
            let event = watcher.recv().await.context("Event stream closed")?;
            match event.event_type() {
                "PlayCompleted" | "PlayError" | "PlayAborted" => break,
                _ => {}
            }
        }
    }

    let state = controller.current_state();
    info!(
        "Reveal gate open after {} verified plays of '{}'",
        state.play_count, main_line_id
    );
    println!("{}", serde_json::to_string_pretty(&state)?);

    Ok(())
}
