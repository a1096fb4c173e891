// src/bin/pose_trace_gen.rs - Writes a synthetic pose trace for `gesture_nav replay`
use std::path::PathBuf;
use std::process;

use clap::Parser;
use gesture_nav::simulation::SimulatedPoseSource;

/// Generate a JSON Lines pose trace from a `pose:ms` script
#[derive(Parser, Debug)]
#[command(
    name = "pose_trace_gen",
    version,
    after_help = "Example: pose_trace_gen right:1200,rest:2400,left:1100 trace.jsonl"
)]
struct Args {
    /// Comma separated phases, e.g. `rest:200,right:1100`
    script: String,

    /// Trace file to write
    output: PathBuf,

    /// Interval between generated frames
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let source = match SimulatedPoseSource::from_script(&args.script, args.tick_ms) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("✗ Invalid script: {}", e);
            process::exit(2);
        }
    };

    let trace = source.into_trace();
    match trace.save(&args.output) {
        Ok(()) => println!("✓ Wrote {} frames to {}", trace.frames.len(), args.output.display()),
        Err(e) => {
            eprintln!("✗ Failed to write trace: {}", e);
            process::exit(1);
        }
    }
}
