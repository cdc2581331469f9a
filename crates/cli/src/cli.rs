//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ingestion::MockScenario;

/// OPEN-EYES - Assistive guidance pipeline for the sensor cane
#[derive(Parser, Debug)]
#[command(
    name = "open-eyes",
    author,
    version,
    about = "Assistive navigation guidance pipeline",
    long_about = "Perception-to-guidance pipeline for the OPEN-EYES sensor cane.\n\n\
                  Consumes cane telemetry (mock, replay or paired hardware), fuses \n\
                  it with an optional walking route, and speaks one instruction at \n\
                  a time through the configured synthesizer."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OPEN_EYES_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "OPEN_EYES_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the guidance pipeline
    Run(RunArgs),

    /// Validate a destination file without running
    Validate(ValidateArgs),

    /// Display destination information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Destination file to navigate toward (JSON or TOML)
    #[arg(short, long, env = "OPEN_EYES_ROUTE")]
    pub route: Option<PathBuf>,

    /// Mock scenario to play when no replay file is given
    #[arg(long, value_enum, default_value = "clear-walk", env = "OPEN_EYES_SCENARIO")]
    pub scenario: ScenarioArg,

    /// Replay a recorded packet stream (JSONL) instead of the mock cane
    #[arg(long, env = "OPEN_EYES_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = recorded pacing)
    #[arg(long, default_value = "1.0")]
    pub replay_speed: f64,

    /// Loop the replay when the recording ends
    #[arg(long)]
    pub replay_loop: bool,

    /// Mock packet cadence in Hz
    #[arg(long, default_value = "10.0", env = "OPEN_EYES_FREQUENCY_HZ")]
    pub frequency_hz: f64,

    /// Maximum number of packets to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "OPEN_EYES_MAX_PACKETS")]
    pub max_packets: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "OPEN_EYES_TIMEOUT")]
    pub timeout: u64,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "OPEN_EYES_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Filter window size (clamped to 2-20)
    #[arg(long, default_value = "5", env = "OPEN_EYES_FILTER_WINDOW")]
    pub filter_window: usize,

    /// Disable the enhanced snapshot mode (no distance shortening)
    #[arg(long)]
    pub basic_snapshot: bool,

    /// Simulate utterance timing on the logging synthesizer
    #[arg(long)]
    pub simulate_speech: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "OPEN_EYES_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Destination file to validate
    #[arg(short, long)]
    pub route: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Destination file
    #[arg(short, long)]
    pub route: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Mock scenario selection
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ScenarioArg {
    /// Open sidewalk, nothing in the way
    #[default]
    ClearWalk,
    /// Ground obstacle closing in, occasional head-height obstacle
    ObstacleCourse,
    /// Dry start, then a puddle crossing
    WaterHazard,
    /// Steady walk along a 45-degree bearing
    CityRoute,
}

impl From<ScenarioArg> for MockScenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::ClearWalk => MockScenario::ClearWalk,
            ScenarioArg::ObstacleCourse => MockScenario::ObstacleCourse,
            ScenarioArg::WaterHazard => MockScenario::WaterHazard,
            ScenarioArg::CityRoute => MockScenario::CityRoute,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
