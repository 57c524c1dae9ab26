use clap::Parser;
use dirsync::{Cli, Config, SyncError};
use std::process;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        // Core errors carry their own exit status; anything else falls to anyhow.
        if let Some(sync_err) = err.downcast_ref::<SyncError>() {
            eprintln!("{}", dirsync::ui::format_error(sync_err));
            process::exit(sync_err.exit_code());
        }
        return Err(err);
    }

    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;
    dirsync::logging::init(config.verbosity);
    dirsync::commands::sync::run(config)?;
    Ok(())
}
