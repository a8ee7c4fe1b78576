//! Replay command implementation.

use crate::cli::ReplayArgs;
use crate::error::Result;
use crate::output::Formatter;
use tribunal_pipeline::ReplayLog;

/// Execute the replay command.
pub fn execute_replay(args: ReplayArgs, formatter: &Formatter) -> Result<()> {
    let snapshots = ReplayLog::new(&args.log).entries()?;
    println!("{}", formatter.format_snapshots(&snapshots)?);
    Ok(())
}
