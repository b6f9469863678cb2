use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "epochlab",
    version,
    about = "EEG epoching and band-power feature extraction",
    long_about = "Segment continuous EEG/EOG recordings into per-trial epochs and extract\n\
                  relative band-power features (band ratios, channel differences,\n\
                  per-class statistics) for motor-imagery classification."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline: epochs, features, per-class statistics
    Run(RunArgs),
    /// Extract epochs only and emit the epoch table
    Epochs(EpochsArgs),
    /// List the configured frequency bands
    Bands(BandsArgs),
    /// Validate a recording/events file pair
    Validate(ValidateArgs),
    /// Run the pipeline over many recordings
    Batch(BatchArgs),
}

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Pipeline settings shared by run/epochs/validate/batch
#[derive(Args, Clone)]
pub struct PipelineArgs {
    /// EEG channel names used for spectral features
    #[arg(long = "eeg-channels", default_values_t = vec!["C3".to_string(), "Cz".to_string(), "C4".to_string()], num_args = 1..)]
    pub eeg_channels: Vec<String>,

    /// Artifact channels (EOG etc.) sliced into epochs but excluded from features
    #[arg(long = "artifact-channels", num_args = 1..)]
    pub artifact_channels: Vec<String>,

    /// Declared class labels
    #[arg(long, default_values_t = vec!["left".to_string(), "right".to_string()], num_args = 1..)]
    pub classes: Vec<String>,

    /// Sampling rate in Hz
    #[arg(long, default_value_t = 250.0)]
    pub sr: f64,

    /// Trial duration in seconds
    #[arg(long = "trial-duration", default_value_t = 4.0)]
    pub trial_duration: f64,

    /// Ordered band boundaries in Hz
    #[arg(long, default_values_t = vec![0.5, 4.0, 7.0, 12.0, 30.0], num_args = 2..)]
    pub bands: Vec<f64>,

    /// Band names, one per interval (canonical names inferred when omitted)
    #[arg(long = "band-names", num_args = 1..)]
    pub band_names: Option<Vec<String>>,

    /// Upper edge of the analyzed bandwidth in Hz (default: top boundary)
    #[arg(long = "max-freq")]
    pub max_freq: Option<f64>,

    /// Welch segment length in samples; omit for a single periodogram
    #[arg(long = "welch-segment")]
    pub welch_segment: Option<usize>,

    /// Welch overlap in samples (default: half the segment)
    #[arg(long = "welch-overlap")]
    pub welch_overlap: Option<usize>,

    /// Band-ratio features as "numerator/denominator" band names
    #[arg(long, default_values_t = vec!["theta/beta".to_string()], num_args = 1..)]
    pub ratios: Vec<String>,

    /// Channel pair "a,b" for lateralization differences ("none" disables)
    #[arg(long = "diff-pair", default_value = "C3,C4")]
    pub diff_pair: String,

    /// Emit IEEE inf/NaN for zero-denominator ratios instead of failing
    #[arg(long = "propagate-division", default_value_t = false)]
    pub propagate_division: bool,

    /// Denominator magnitude below which a band ratio is rejected
    #[arg(long = "min-denominator", default_value_t = 1e-12)]
    pub min_denominator: f64,

    /// Add mean instantaneous amplitude/frequency features per channel
    #[arg(long, default_value_t = false)]
    pub instantaneous: bool,

    /// Map event codes to class labels, e.g. "1=left,2=right"
    #[arg(long = "label-map")]
    pub label_map: Option<String>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Recording CSV (header row of channel names; optional time/start columns)
    #[arg(long)]
    pub file: String,

    /// Events CSV: "onset,label" rows, or labels pairing with start markers
    #[arg(long)]
    pub events: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct EpochsArgs {
    /// Recording CSV
    #[arg(long)]
    pub file: String,

    /// Events CSV
    #[arg(long)]
    pub events: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Args)]
pub struct BandsArgs {
    /// Ordered band boundaries in Hz (default: canonical EEG partition)
    #[arg(long, num_args = 2..)]
    pub bands: Option<Vec<f64>>,

    /// Band names, one per interval
    #[arg(long = "band-names", num_args = 1..)]
    pub band_names: Option<Vec<String>>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Recording CSV
    #[arg(long)]
    pub file: String,

    /// Events CSV
    #[arg(long)]
    pub events: Option<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for recording CSVs
    #[arg(long)]
    pub glob: Option<String>,

    /// Explicit recording file list
    #[arg(long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Shared events CSV; default is "<stem>_events.csv" next to each file
    #[arg(long)]
    pub events: Option<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Directory for per-file JSON results (default: JSONL to stdout)
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,

    /// Keep going after per-file failures
    #[arg(long = "continue-on-error", default_value_t = false)]
    pub continue_on_error: bool,

    /// Print the resolved file list and exit
    #[arg(long = "dry-run", default_value_t = false)]
    pub dry_run: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}
