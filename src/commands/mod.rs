//! Command dispatch and handlers.

pub mod attendance;
pub mod employee;
pub mod init;
pub mod leave;
pub mod task;

use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::config::RosterConfig;
use crate::context::ServiceContext;
use crate::store::RosterStore;

/// Dispatch a parsed command to its handler.
///
/// Configuration is resolved once here: the config file and environment,
/// then the `--database` flag on top.
///
/// # Errors
///
/// Returns an error string if configuration fails or the selected command
/// handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let mut config = RosterConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(database) = &cli.database {
        config.database.clone_from(database);
    }
    let ctx = ServiceContext::live(config).map_err(|e| e.to_string())?;
    dispatch_with_context(&cli.command, &ctx)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Init => init::run(ctx),
        Command::Employee(cmd) => employee::run(ctx, cmd),
        Command::Task(cmd) => task::run(ctx, cmd),
        Command::Leave(cmd) => leave::run(ctx, cmd),
        Command::Attendance(cmd) => attendance::run(ctx, cmd),
    }
}

/// Opens the configured database, creating the schema on first use.
fn open_store(ctx: &ServiceContext) -> Result<RosterStore<'_>, String> {
    let store = RosterStore::open(ctx).map_err(|e| e.to_string())?;
    store.init().map_err(|e| e.to_string())?;
    Ok(store)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

/// Prints left-aligned columns sized to the widest cell.
fn print_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        let padded: Vec<String> =
            cells.iter().zip(widths).map(|(cell, width)| format!("{cell:<width$}")).collect();
        println!("{}", padded.join("  ").trim_end());
    };
    line(&headers);
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", rules.join("  "));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&cells);
    }
}
