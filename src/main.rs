use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use rust_showcase::config::Configuration;
use rust_showcase::events::{LoadTexture, TextureEvent, ViewerCommand};
use rust_showcase::stage::{Stage, simulate_timeline};
use rust_showcase::tasks;

#[derive(Debug, Parser)]
#[command(
    name = "showcase",
    version,
    about = "hero crossfade and circular gallery viewer"
)]
struct Args {
    /// Path to YAML config (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// Run the stage headless for this many seconds and print what happened
    #[arg(long = "timeline-dry-run", value_name = "SECONDS")]
    timeline_dry_run: Option<f32>,
    /// Fixed frame rate for the dry run
    #[arg(long = "timeline-fps", value_name = "FPS", default_value_t = 60.0)]
    timeline_fps: f32,
    /// Raw gallery scroll offset (0..=1) applied during the dry run
    #[arg(long = "scroll", value_name = "OFFSET")]
    scroll: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let Args {
        config,
        timeline_dry_run,
        timeline_fps,
        scroll,
    } = Args::parse();

    let cfg = match &config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    match &config {
        Some(path) => tracing::info!("Loaded configuration from {}:\n{:#?}", path.display(), cfg),
        None => tracing::info!("Using built-in configuration:\n{:#?}", cfg),
    }

    if let Some(seconds) = timeline_dry_run {
        run_timeline_dry_run(&cfg, seconds, timeline_fps, scroll);
        return Ok(());
    }

    // Channels (small/bounded)
    let (to_load_tx, to_load_rx) = mpsc::channel::<LoadTexture>(16); // Main -> Loader
    let (loaded_tx, loaded_rx) = mpsc::channel::<TextureEvent>(8); // Loader -> Viewer
    let (viewer_control_tx, viewer_control_rx) = mpsc::channel::<ViewerCommand>(16); // Timer/signals -> Viewer

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        let control = viewer_control_tx.clone();
        tokio::spawn(async move {
            match signal(SignalKind::user_defined1()) {
                Ok(mut sigusr1) => loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        received = sigusr1.recv() => {
                            if received.is_none() {
                                break;
                            }
                            tracing::info!("SIGUSR1 received; advancing slide");
                            if let Err(err) = control.send(ViewerCommand::AdvanceSlide).await {
                                tracing::warn!("failed to forward slide advance request: {err}");
                                break;
                            }
                        }
                    }
                },
                Err(err) => tracing::warn!("failed to register SIGUSR1 handler: {err}"),
            }
        });
    }

    let mut tasks = JoinSet::new();

    // TextureLoader
    tasks.spawn({
        let cancel = cancel.clone();
        let max_in_flight = cfg.loader_max_concurrent_decodes;
        let max_dimension = cfg.max_texture_dimension;
        async move {
            tasks::loader::run(to_load_rx, loaded_tx, cancel, max_in_flight, max_dimension)
                .await
                .context("loader task failed")
        }
    });

    // Queue every catalog asset once; the catalog already deduplicated paths.
    tasks.spawn({
        let requests = Stage::from_config(&cfg).catalog().load_requests();
        let cancel = cancel.clone();
        async move {
            tracing::info!(count = requests.len(), "queueing textures");
            for request in requests {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = to_load_tx.send(request) => {
                        sent.context("loader stopped before all textures were queued")?;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        }
    });

    // Run the windowed viewer on the main thread (blocking) after spawning other tasks
    // This call returns when the window closes or cancellation occurs
    if let Err(e) = tasks::viewer::run_windowed(
        loaded_rx,
        cancel.clone(),
        cfg.clone(),
        viewer_control_rx,
        viewer_control_tx,
    )
    .context("viewer failed")
    {
        tracing::error!("{e:?}");
    }
    // Ensure other tasks are asked to stop
    cancel.cancel();

    // Drain JoinSet (wait for other tasks to complete)
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

fn run_timeline_dry_run(cfg: &Configuration, seconds: f32, fps: f32, scroll: Option<f32>) {
    let report = simulate_timeline(cfg, seconds, fps, scroll);

    println!(
        "# timeline dry run\n# seconds: {}\n# fps: {}\n# frames: {}\n# auto-advance: {}\n",
        report.seconds,
        report.fps,
        report.frames,
        humantime::format_duration(cfg.hero.effective_auto_advance()),
    );

    println!("# slide commits:");
    if report.commits.is_empty() {
        println!("(none)");
    } else {
        for entry in &report.commits {
            println!(
                "  t={:>8.3}s  {} -> {}",
                entry.at, entry.commit.from, entry.commit.to
            );
        }
    }
    println!("\n# active slide: {}", report.active_index);
    println!("# damped scroll: {:.4}", report.damped_scroll);

    println!("\n# gallery items:");
    for item in &report.items {
        println!(
            "  {:>2}: angle={:>7.3} pos=({:>6.3}, {:>6.3}, {:>6.3}) opacity={:.3} grayscale={:.3}",
            item.index,
            item.angle,
            item.position[0],
            item.position[1],
            item.position[2],
            item.opacity,
            item.grayscale,
        );
    }
}
