use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use torrentgen::config::Config;
use torrentgen::torrent::{self, PLACEHOLDER_NAME};
use torrentgen::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Create a private, tracker-less torrent file for a file or directory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File or directory to describe
    input: PathBuf,

    /// Where to write the torrent, defaults to `<name>.torrent`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the `created by` field
    #[arg(long)]
    created_by: Option<String>,

    /// Fixed creation date in seconds since the epoch
    #[arg(long)]
    creation_date: Option<i64>,
}

fn default_output(input: &std::path::Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER_NAME);
    PathBuf::from(format!("{name}.torrent"))
}

fn run(args: Args) -> Result<()> {
    let mut cfg = match &args.config {
        Some(path) => Config::load_json_file(path)?,
        None => Config::default(),
    };
    if let Some(created_by) = args.created_by {
        cfg.created_by = created_by;
    }
    if args.creation_date.is_some() {
        cfg.creation_date = args.creation_date;
    }

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    let meta = cfg.metadata(chrono::Utc::now());
    let summary = torrent::create_torrent(&args.input, &output, &meta)?;

    println!("{}", summary.output.display());
    println!("info hash: {}", summary.info_hash);
    println!(
        "{} file(s), {} bytes, {} piece(s)",
        summary.file_count, summary.total_length, summary.piece_count
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("torrentgen=info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "failed to create torrent");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
