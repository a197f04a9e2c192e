//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use waymark_cli::CliError;

fn main() {
    match waymark_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("waymark: {err}");
            std::process::exit(1);
        }
    }
}
