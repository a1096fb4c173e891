// src/main.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use gesture_nav::data::SessionRecorder;
use gesture_nav::simulation::SimulatedPoseSource;
use gesture_nav::{
    GestureEngine, GestureFeedback, NavigationSink, PoseFrame, PoseSource, SectionDeck, Settings,
    TraceSource,
};

/// Drive a section viewer with raised-arm gestures
#[derive(Parser, Debug)]
#[command(name = "gesture_nav", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print every tick and log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded pose trace (JSON Lines)
    Replay {
        #[arg(short, long)]
        trace: PathBuf,

        /// Export ticks.csv and report.html for the session
        #[arg(long)]
        record: bool,
    },

    /// Run a scripted synthetic pose stream, e.g. "right:1200,rest:400,left:1100"
    Simulate {
        #[arg(short, long)]
        script: String,

        #[arg(long, default_value = "16")]
        tick_ms: u64,

        #[arg(long)]
        record: bool,
    },

    /// Show or initialise the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .init();

    let settings = Settings::load_or_default(cli.config.as_deref())
        .context("loading settings")?;

    match cli.command {
        Commands::Replay { trace, record } => {
            let mut source = TraceSource::open(&trace);
            run_session(&settings, &mut source, record, cli.verbose)?;
            if source.skipped_lines() > 0 {
                eprintln!("Skipped {} malformed trace lines", source.skipped_lines());
            }
        }
        Commands::Simulate { script, tick_ms, record } => {
            let mut source = SimulatedPoseSource::from_script(&script, tick_ms)
                .context("parsing simulation script")?;
            run_session(&settings, &mut source, record, cli.verbose)?;
        }
        Commands::Config { action } => {
            let path = cli.config.clone().unwrap_or_else(Settings::default_path);
            match action {
                ConfigAction::Show => {
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                }
                ConfigAction::Init { force } => {
                    if path.exists() && !force {
                        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                    }
                    Settings::default().save(&path)?;
                    println!("Wrote {}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Log filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "gesture_nav=debug"
    } else {
        "gesture_nav=info"
    }
}

fn run_session<P: PoseSource>(settings: &Settings, source: &mut P, record: bool, verbose: bool) -> Result<()> {
    let deck = SectionDeck::new(settings.sections.clone())?;
    let mut engine = GestureEngine::new(settings.gesture.clone(), deck);
    let mut recorder = record.then(|| {
        SessionRecorder::new(&settings.output_directory, None, settings.sections.clone())
    });

    let summary = engine.run(source, |frame, feedback| {
        if verbose || feedback.fired.is_some() {
            print_tick(frame, feedback);
        }
        if let Some(recorder) = recorder.as_mut() {
            recorder.add_tick(feedback);
        }
    })?;

    let deck = engine.sink();
    println!(
        "{} frames, {} advances, {} retreats, final section {}/{}: {}",
        summary.frames,
        summary.advances,
        summary.retreats,
        summary.final_index + 1,
        deck.page_count(),
        deck.current_section()
    );

    if let Some(recorder) = recorder {
        let csv_path = recorder.export_csv()?;
        let report_path = recorder.generate_report()?;
        info!("Session written to {} and {}", csv_path.display(), report_path.display());
    }

    Ok(())
}

fn print_tick(frame: &PoseFrame, feedback: &GestureFeedback) {
    let indicator = feedback.indicator().map_or("idle", |d| d.as_str());
    let fired = feedback.fired.map_or("", |c| c.as_str());
    println!(
        "{:>7}ms  {:<8} {:>5.1}%  page {}  {}",
        frame.timestamp_ms,
        indicator,
        feedback.progress,
        feedback.current_index + 1,
        fired
    );
}
