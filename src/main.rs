use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use tecinterp::{FrameLayout, FrameReader, NumericPolicy, TableWriter, VtuWriter};

/// Interpolate the nodal fields of an ASCII Tecplot export to cell centers,
/// writing one tab-separated table per frame.
#[derive(Parser, Debug)]
#[command(name = "tecinterp", version, about)]
struct Options {
    /// Tecplot ASCII file to read
    input: PathBuf,

    /// Directory receiving output_NNNN.txt files
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// key=value annotations copied into every output header
    #[arg(value_parser = parse_annotation)]
    params: Vec<(String, String)>,

    /// Store malformed numbers as 0.0 instead of failing the frame
    #[arg(long)]
    lenient_numbers: bool,

    /// Also write output_NNNN.vtu next to each table
    #[arg(long)]
    vtu: bool,

    /// Leave out columns that are zero in every cell
    #[arg(long)]
    skip_zero_columns: bool,

    /// Skip frames that fail to parse instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_annotation(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", arg))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in `{}`", arg));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: &Options) -> Result<()> {
    let start_time = Instant::now();

    let text = fs::read_to_string(&options.input)
        .with_context(|| format!("file `{}` not found or unreadable", options.input.display()))?;

    let policy = if options.lenient_numbers { NumericPolicy::ZeroFill } else { NumericPolicy::Strict };
    let layout = FrameLayout::default().with_numeric_policy(policy);

    fs::create_dir_all(&options.output)
        .with_context(|| format!("cannot create output directory `{}`", options.output.display()))?;
    let writer = TableWriter::new(&options.output, options.input.display().to_string())
        .with_annotations(options.params.clone())
        .with_skip_zero_columns(options.skip_zero_columns);

    let mut written = 0usize;
    let mut skipped = 0usize;
    for (index, result) in FrameReader::new(&text, layout).enumerate() {
        let frame = match result {
            Ok(frame) => frame,
            Err(e) if options.keep_going && e.is_frame_local() => {
                warn!("skipping frame {}: {}", index, e);
                skipped += 1;
                continue;
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("frame {} of `{}`", index, options.input.display())));
            }
        };

        let path = writer
            .write_frame(index, &frame)
            .with_context(|| format!("writing frame {} to `{}`", index, writer.output_dir().display()))?;
        if options.vtu {
            let vtu_path = path.with_extension("vtu");
            VtuWriter::write_vtu(&frame, &vtu_path)
                .with_context(|| format!("writing `{}`", vtu_path.display()))?;
        }
        info!("frame {}: {}", index, frame.summary());
        written += 1;
    }

    let elapsed_s = start_time.elapsed().as_secs_f64();
    info!("read {} frames in {:.3e} seconds", written + skipped, elapsed_s);
    if skipped > 0 {
        warn!("{} of {} frames were skipped", skipped, written + skipped);
    }
    Ok(())
}

fn main() {
    let options = Options::parse();
    init_logging(options.verbose);

    if let Err(e) = run(&options) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
