//! Employee roster with collision-free sequential employee numbers.
//!
//! Employee numbers such as `EMP0001` come from [`allocator`]: inside the
//! registering transaction it locks the tail row of the employees table,
//! reads the last issued number through a [`ports::LastValueProvider`],
//! and hands out the successor. [`adapters`] provides a `SQLite` provider
//! and an in-memory one for tests; [`store`] builds employee, task, leave, and
//! attendance operations on top.

pub mod adapters;
pub mod allocator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod ident;
pub mod logging;
pub mod ports;
pub mod records;
pub mod store;
pub mod validate;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    let _ = dotenvy::dotenv();
    logging::init(cli.log_level.as_deref());
    commands::dispatch(&cli)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_initializes_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("roster.db");
        let result = run(["roster", "--database", db.to_str().unwrap(), "init"]);
        assert!(result.is_ok(), "{result:?}");
        assert!(db.exists());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["roster", "unknown"]);
        assert!(result.is_err());
    }
}
