//! CLI argument parsing with clap.

use clap::Parser;

/// Open the Customer's Canvas design editor and save the result locally.
///
/// No arguments are required: the editor opens in your browser and the
/// design is written to the working directory once you save it.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Print the launch URL instead of opening a browser.
    #[arg(long)]
    pub no_browser: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
