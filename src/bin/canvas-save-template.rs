//! Open the editor on a design template and save the design.

use std::process;

use canvas_save::app;
use canvas_save::cli::Cli;
use canvas_save::session::ModeKind;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    canvas_save::logging::init(cli.verbose);

    match app::run(ModeKind::Template, &cli) {
        Ok(saved) => eprintln!("Saved: {}", saved.path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
