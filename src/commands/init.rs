//! `roster init` command.

use crate::context::ServiceContext;

/// Execute the `init` command.
///
/// # Errors
///
/// Returns an error string if the database cannot be opened or migrated.
pub fn run(ctx: &ServiceContext) -> Result<(), String> {
    super::open_store(ctx)?;
    println!("Initialized roster database at {}", ctx.config.database.display());
    Ok(())
}
