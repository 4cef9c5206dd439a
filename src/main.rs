use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use svg_spread::{Error, SpreadJob};

#[derive(Parser)]
#[command(name = "svg-spread", about = "Compose Inkscape layouts into PDF spreads", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the layout extracted from a layout SVG
    Layout {
        /// Layout SVG file
        input: PathBuf,
    },

    /// Print the ladder extracted from a sub-document SVG
    Ladder {
        /// Ladder SVG file
        input: PathBuf,
    },

    /// Print the composed spread without rendering it
    Compose(JobArgs),

    /// Compose a spread and write it as a PDF with form fields
    Render {
        #[command(flatten)]
        job: JobArgs,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Layout SVG file
    #[arg(short, long)]
    layout: PathBuf,

    /// Spread (page) name as used in the layout
    #[arg(short, long)]
    spread: String,

    /// Raster produced by the previous stage
    #[arg(short, long)]
    previous: Option<PathBuf>,

    /// Page number used in form field names
    #[arg(long, default_value = "1")]
    page: u32,

    /// Replace the text of a prefill (repeatable)
    #[arg(long = "prefill", value_name = "ID=TEXT", value_parser = parse_pair)]
    prefills: Vec<(String, String)>,

    /// Replace a decorative image's base filename (repeatable)
    #[arg(long = "image", value_name = "NAME=FILE", value_parser = parse_pair)]
    images: Vec<(String, String)>,
}

impl From<JobArgs> for SpreadJob {
    fn from(args: JobArgs) -> Self {
        SpreadJob {
            layout_path: args.layout,
            spread_name: args.spread,
            previous_image: args.previous,
            page_number: args.page,
            prefills: args.prefills.into_iter().collect::<HashMap<_, _>>(),
            image_overrides: args.images.into_iter().collect::<HashMap<_, _>>(),
        }
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Layout { input } => {
            println!("{}", svg_spread::to_pretty_json(&svg_spread::load_layout(&input)?)?);
        }
        Commands::Ladder { input } => {
            println!("{}", svg_spread::to_pretty_json(&svg_spread::load_ladder(&input)?)?);
        }
        Commands::Compose(args) => {
            let job = SpreadJob::from(args);
            let mut spread = svg_spread::compose_spread(&job)?;
            svg_spread::apply_overrides(&mut spread, &job.prefills, &job.image_overrides);
            println!("{}", svg_spread::to_pretty_json(&spread)?);
        }
        Commands::Render { job, output } => {
            svg_spread::render_spread(&SpreadJob::from(job), &output)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
