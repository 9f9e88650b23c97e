//! textra - batch image-to-text conversion.
//!
//! Entry point for the textra CLI binary.

use clap::Parser;
use textra::cli::{run_app, Cli};
use textra::error::ExitCode;
use textra::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            log::error!("{err:#}");
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}
