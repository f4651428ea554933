//! Binary entrypoint for the `roster` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match roster::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
