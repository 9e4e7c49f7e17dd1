use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use bitrate_graph::{
    AnalysisOptions, ChartOptions, ComparisonSeries, ProbeFormat, ProbeMode, ProgressCallback,
    ProgressInfo,
    analysis::{file_label, file_stem},
    analyze_many, plot_comparison, plot_results,
    probe::sidecar_path,
    validation::ensure_inputs_exist,
};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  bitrate-graph -i input.mp4\n  bitrate-graph -i input.mp4 -f json -o chart -t \"My encode\"\n  bitrate-graph -i a.mp4 b.mkv --progress\n  bitrate-graph -i input.mp4 --mode packets --window 0.5 --no-sidecar\n  bitrate-graph --completions zsh > _bitrate-graph";

const DEFAULT_COMPARISON_FILENAME: &str = "comparison";

#[derive(Debug, Parser)]
#[command(
    name = "bitrate-graph",
    version,
    about = "Plot the video bitrate of media files over time",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// One or more input media files. Several files produce a comparison chart.
    #[arg(
        short = 'i',
        long = "input-video-path",
        num_args = 1..,
        required_unless_present = "completions"
    )]
    inputs: Vec<PathBuf>,

    /// Format of the probe sidecar file (xml, json).
    #[arg(short = 'f', long = "output-format", default_value = "xml")]
    output_format: String,

    /// Output image filename without extension. Defaults to the input file
    /// stem, or `comparison` for several inputs.
    #[arg(short = 'o', long = "output-filename")]
    output_filename: Option<PathBuf>,

    /// Chart title. Defaults to the input file name, or a list of all input
    /// file names for several inputs.
    #[arg(short = 't', long)]
    title: Option<String>,

    /// Stream units to probe (frames, packets).
    #[arg(long, default_value = "frames")]
    mode: String,

    /// Aggregation window width in seconds.
    #[arg(long, default_value_t = 1.0)]
    window: f64,

    /// Path to the ffprobe executable.
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Stream specifier passed to `-select_streams`.
    #[arg(long, default_value = "v:0")]
    stream: String,

    /// Directory for probe sidecar files.
    #[arg(long)]
    sidecar_dir: Option<PathBuf>,

    /// Do not write probe sidecar files.
    #[arg(long, conflicts_with = "sidecar_dir")]
    no_sidecar: bool,

    /// Print a machine-readable JSON summary of every analyzed stream.
    #[arg(long)]
    json: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar across input files.
    #[arg(long)]
    progress: bool,

    /// Generate a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        if let Some(file) = &info.current_file {
            self.bar.set_message(file_label(file));
        }
        if info.total.is_some_and(|total| info.current >= total) {
            self.bar.finish_and_clear();
        }
    }
}

fn analysis_options(cli: &Cli) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
    let format: ProbeFormat = cli.output_format.parse()?;
    let mode: ProbeMode = cli.mode.parse()?;

    let mut options = AnalysisOptions::new()
        .with_format(format)
        .with_mode(mode)
        .with_window_seconds(cli.window)
        .with_ffprobe_path(&cli.ffprobe)
        .with_stream_selector(&cli.stream)
        .with_sidecar(!cli.no_sidecar);

    if let Some(dir) = &cli.sidecar_dir {
        options = options.with_sidecar_dir(dir);
    }

    if cli.progress {
        let progress = TerminalProgress::new(cli.inputs.len() as u64)?;
        options = options.with_progress(Arc::new(progress));
    }

    Ok(options)
}

/// Output stem: the explicit filename, else the input stem for one file or
/// `comparison` for several.
fn output_stem(inputs: &[PathBuf], explicit: Option<&Path>) -> PathBuf {
    match (explicit, inputs) {
        (Some(explicit), _) => explicit.to_path_buf(),
        (None, [single]) => file_stem(single),
        _ => PathBuf::from(DEFAULT_COMPARISON_FILENAME),
    }
}

/// Chart title: the explicit title, else the input file name for one file
/// or `Bitrate Comparison: a, b, ...` for several.
fn chart_title(inputs: &[PathBuf], explicit: Option<&str>) -> String {
    match (explicit, inputs) {
        (Some(explicit), _) => explicit.to_string(),
        (None, [single]) => file_label(single),
        _ => {
            let names: Vec<String> = inputs.iter().map(|input| file_label(input)).collect();
            format!("Bitrate Comparison: {}", names.join(", "))
        }
    }
}

fn print_summary(series: &[ComparisonSeries]) -> Result<(), Box<dyn std::error::Error>> {
    let streams: Vec<_> = series
        .iter()
        .map(|entry| {
            let stats = entry.result.statistics();
            json!({
                "file": entry.label,
                "codec": entry.result.encoder(),
                "windows": entry.result.len(),
                "keyframe_windows": entry.result.keyframes().len(),
                "mean_mbps": stats.mean,
                "min_mbps": stats.min,
                "max_mbps": stats.max,
                "std_dev_mbps": stats.std_dev,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&streams)?);
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "bitrate-graph", &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    ensure_inputs_exist(&cli.inputs)?;

    let options = analysis_options(&cli)?;
    let chart_options = ChartOptions::new();
    let stem = output_stem(&cli.inputs, cli.output_filename.as_deref());
    let title = chart_title(&cli.inputs, cli.title.as_deref());

    let series = analyze_many(&cli.inputs, &options)?;
    if cli.json {
        print_summary(&series)?;
    }

    let sidecars: Vec<String> = cli
        .inputs
        .iter()
        .map(|input| {
            sidecar_path(input, options.format(), cli.sidecar_dir.as_deref())
                .display()
                .to_string()
        })
        .collect();

    if let [single] = series.as_slice() {
        println!("Done. Now plotting results ...");
        let image = plot_results(&single.result, &title, &stem, &chart_options)?;
        if cli.no_sidecar {
            println!("{} Check {}!", "Done.".green().bold(), image.display());
        } else {
            println!(
                "{} Check {} and {}!",
                "Done.".green().bold(),
                image.display(),
                sidecars.join(", ")
            );
        }
    } else {
        println!("Done. Now plotting comparison results ...");
        let image = plot_comparison(&series, &title, &stem, &chart_options)?;
        if cli.no_sidecar {
            println!("{} Check {}!", "Done.".green().bold(), image.display());
        } else {
            println!(
                "{} Check {} and sidecar files: {}",
                "Done.".green().bold(),
                image.display(),
                sidecars.join(", ")
            );
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use super::{Cli, chart_title, output_stem};

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn output_stem_defaults() {
        assert_eq!(
            output_stem(&paths(&["videos/clip.mp4"]), None),
            PathBuf::from("clip")
        );
        assert_eq!(
            output_stem(&paths(&["a.mp4", "b.mkv"]), None),
            PathBuf::from("comparison")
        );
        assert_eq!(
            output_stem(&paths(&["a.mp4"]), Some(Path::new("chart"))),
            PathBuf::from("chart")
        );
    }

    #[test]
    fn chart_title_defaults() {
        assert_eq!(chart_title(&paths(&["videos/clip.mp4"]), None), "clip.mp4");
        assert_eq!(
            chart_title(&paths(&["x/a.mp4", "y/b.mkv"]), None),
            "Bitrate Comparison: a.mp4, b.mkv"
        );
        assert_eq!(chart_title(&paths(&["a.mp4"]), Some("Custom")), "Custom");
    }

    #[test]
    fn cli_parses_multiple_inputs() {
        let cli = Cli::try_parse_from([
            "bitrate-graph",
            "-i",
            "a.mp4",
            "b.mkv",
            "-f",
            "json",
            "-o",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.inputs, paths(&["a.mp4", "b.mkv"]));
        assert_eq!(cli.output_format, "json");
        assert_eq!(cli.output_filename, Some(PathBuf::from("out")));
        assert_eq!(cli.window, 1.0);
    }

    #[test]
    fn cli_requires_input() {
        assert!(Cli::try_parse_from(["bitrate-graph"]).is_err());
        assert!(Cli::try_parse_from(["bitrate-graph", "--completions", "bash"]).is_ok());
    }

    #[test]
    fn cli_rejects_sidecar_dir_with_no_sidecar() {
        let parsed = Cli::try_parse_from([
            "bitrate-graph",
            "-i",
            "a.mp4",
            "--no-sidecar",
            "--sidecar-dir",
            "probes",
        ]);
        assert!(parsed.is_err());
    }
}
