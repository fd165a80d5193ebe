//! PDA Counter - Multi-channel persistent counter
//!
//! Main entry point for the console application.
//!
//! # Execution Flow
//!
//! 1. Parse command line (`--new` to start fresh, resume otherwise)
//! 2. Load `PDA Counter Config.yaml` from the configuration directory
//! 3. Initialize logging → <log dir>/pda-counter.<date>
//! 4. Start a [`CounterSession`] backed by the JSON state file
//! 5. Run the console until `quit` or end of input
//! 6. Flush the record once more and log the session summary

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use pda_counter::ui::ConsoleController;
use pda_counter::{APP_NAME, ConfigManager, CounterSession, JsonFileStore, SessionMode, VERSION};
use std::io;

#[derive(Parser, Debug)]
#[command(name = "pda-counter", version)]
#[command(about = "Multi-channel PDA counter with persistent state", long_about = None)]
struct Cli {
    /// Start a new session instead of resuming the saved one
    #[arg(long)]
    new: bool,

    /// Directory holding the configuration and the state file
    #[arg(long, default_value = "PDA Counter Data")]
    config_dir: Utf8PathBuf,

    /// Override the configured target for this run
    #[arg(long)]
    target: Option<u64>,

    /// Enable debug logging and console log output
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let user_config = config_manager.load_user_config()?;
    let settings = &user_config.counter;

    let debug = cli.debug || settings.debug_mode;
    let log_dir = config_manager.config_dir().join(&settings.log_dir);
    let _guard =
        pda_counter::logging::setup_logging_with_console(log_dir.as_str(), APP_NAME, debug, debug)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let target = match cli.target {
        Some(0) => anyhow::bail!("--target must be at least 1"),
        Some(target) => target,
        None => settings.target,
    };
    let mode = if cli.new {
        SessionMode::New
    } else {
        SessionMode::Resume
    };

    let store = JsonFileStore::new(config_manager.state_file_path(&user_config));
    let session = CounterSession::start(store, target, mode)
        .with_save_failure_policy(settings.save_failure_policy);

    let stdin = io::stdin();
    let controller = ConsoleController::new(session, stdin.lock(), io::stdout());
    let session = controller.run()?;

    // A new session that was never changed leaves the previous record alone
    if session.metrics().mutations() > 0 {
        session.save()?;
    }

    session.metrics().log_summary();
    tracing::info!("Application shutdown complete");
    Ok(())
}
