use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use clap::{ArgAction, Parser};
use jsonc_arena::arena::Arena;
use jsonc_arena::constants::DEFAULT_MAX_DEPTH;
use jsonc_arena::{ParseOptions, Stats};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "jsonc-dump",
    version,
    about = "Parse JSON with comments into an arena and print the tree"
)]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Print the node, entry and string byte counts instead of the tree.
    #[arg(long)]
    stats: bool,

    /// Treat `//` and `/* */` as syntax errors.
    #[arg(long = "no-comments", action = ArgAction::SetFalse, default_value_t = true)]
    comments: bool,

    /// Deepest container nesting accepted.
    #[arg(long, value_name = "number", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Refuse inputs whose arena would exceed this many bytes.
    #[arg(long, value_name = "bytes")]
    max_arena_bytes: Option<usize>,

    /// Log parser events to stderr (-v for debug, -vv for trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_comments(self.comments)
            .with_max_depth(self.max_depth)
            .with_max_arena_bytes(self.max_arena_bytes)
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "jsonc_arena=debug",
        _ => "jsonc_arena=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = read_input(args.input.as_deref())?;
    let options = args.parse_options();
    tracing::debug!(
        bytes = input.len(),
        comments = options.comments,
        max_depth = options.max_depth,
        "input loaded"
    );

    let rendered = if args.stats {
        let stats = jsonc_arena::count_with_options(&input, &options)?;
        render_stats(&stats)?
    } else {
        let doc = jsonc_arena::parse_with_options(&input, &options)?;
        let rendered = doc.dump();
        doc.release();
        rendered
    };

    write_output(args.output.as_deref(), rendered.as_bytes())
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => fs::read(path).map_err(|err| format!("cannot read {path}: {err}").into()),
    }
}

fn render_stats(stats: &Stats) -> Result<String, Box<dyn Error>> {
    let arena_bytes = Arena::byte_size(stats).ok_or("arena size overflows usize")?;
    Ok(format!(
        "nodes: {}\nentries: {}\nstring_bytes: {}\narena_bytes: {arena_bytes}\n",
        stats.nodes, stats.entries, stats.string_bytes
    ))
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) if path != "-" => fs::write(path, data)?,
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
            handle.flush()?;
        }
    }
    Ok(())
}
