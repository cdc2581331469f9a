//! `run` command - drive the pipeline from a mock or replay source.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use contracts::{PacketSource, PipelineConfig, SnapshotMode};
use guidance::{GuidanceHandle, TracingSpeech};
use ingestion::{BackpressureConfig, CaneIngest, MockCane, MockCaneConfig, ReplayCane, ReplayConfig};
use navigation::{RouteLoader, RouteNavigator};
use pipeline::{GuidancePipeline, PipelineOptions, PipelineStats};

use crate::cli::RunArgs;

/// Run the guidance pipeline to completion
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    // Metrics endpoint (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let config = build_config(args);
    let navigator = load_navigator(args, &config)?;

    // Packet source: replay recording or mock cane
    let source: Box<dyn PacketSource> = match &args.replay {
        Some(path) => {
            info!(path = %path.display(), "Running in REPLAY mode");
            Box::new(ReplayCane::new(
                "OPEN-EYES-REPLAY",
                ReplayConfig {
                    path: path.clone(),
                    speed_multiplier: args.replay_speed,
                    loop_playback: args.replay_loop,
                    rebase_timestamps: true,
                },
            ))
        }
        None => {
            info!(scenario = ?args.scenario, "Running in MOCK mode (no paired cane required)");
            Box::new(MockCane::new(
                "OPEN-EYES",
                MockCaneConfig {
                    frequency_hz: args.frequency_hz,
                    scenario: args.scenario.into(),
                    ..Default::default()
                },
            ))
        }
    };

    // Ingestion bridge
    let mut ingest = CaneIngest::with_config(BackpressureConfig {
        channel_capacity: args.buffer_size,
        ..Default::default()
    });
    ingest.register_source(source);
    let packet_rx = ingest
        .take_receiver()
        .context("Failed to get ingestion receiver")?;

    // Guidance worker around the logging synthesizer
    let mut speech = TracingSpeech::new("voice");
    if args.simulate_speech {
        speech = speech.with_simulated_timing();
    }
    let guidance = GuidanceHandle::spawn(
        speech,
        config.executor.clone(),
        config.channels.guidance_capacity,
    );

    // Pipeline
    let pipeline = GuidancePipeline::new(config, navigator);
    let stop = pipeline.stop_handle();

    // Ctrl-C requests a cooperative stop
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping pipeline");
            signal_stop.stop();
        }
    });

    ingest.start();

    let options = PipelineOptions {
        max_packets: (args.max_packets > 0).then_some(args.max_packets),
    };

    let run_future = pipeline.run(packet_rx, guidance, options);
    let stats = if args.timeout > 0 {
        match tokio::time::timeout(Duration::from_secs(args.timeout), run_future).await {
            Ok(stats) => stats,
            Err(_) => {
                warn!(timeout_secs = args.timeout, "Pipeline timed out");
                PipelineStats::default()
            }
        }
    } else {
        run_future.await
    };

    ingest.stop();
    stats.print_summary();

    Ok(())
}

fn build_config(args: &RunArgs) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.filter.window_size = args.filter_window;
    config.channels.ingest_capacity = args.buffer_size;
    if args.basic_snapshot {
        config.snapshot_mode = SnapshotMode::Basic;
    }
    config
}

fn load_navigator(args: &RunArgs, config: &PipelineConfig) -> Result<Option<RouteNavigator>> {
    let Some(path) = &args.route else {
        return Ok(None);
    };

    let destination = RouteLoader::load_from_path(path)
        .with_context(|| format!("Failed to load route from {}", path.display()))?;

    info!(
        name = %destination.name,
        waypoints = destination.waypoints.len(),
        "Route loaded"
    );

    let mut navigator = RouteNavigator::new(config.navigator.clone());
    navigator
        .load_destination(destination)
        .context("Route failed validation")?;
    Ok(Some(navigator))
}
