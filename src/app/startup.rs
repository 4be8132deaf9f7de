//! Application startup sequence
//!
//! Parses arguments, initialises logging, loads configuration and
//! dispatches to the selected subcommand. Returns the process exit code.

use crate::app::cli::args::{Args, Command};
use crate::app::cli::config;
use crate::app::commands;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use clap::Parser;
use std::io::IsTerminal;

pub async fn startup() -> i32 {
    let args = Args::parse();

    let use_color = (args.color || std::io::stdout().is_terminal()) && !args.no_color;
    colored::control::set_override(use_color);

    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        args.log_file.as_deref().and_then(|p| p.to_str()),
        use_color,
    ) {
        eprintln!("Failed to initialise logging: {e}");
        return 1;
    }

    log::debug!(
        "tagvcr {} (built {}, {})",
        env!("CARGO_PKG_VERSION"),
        crate::BUILD_TIME,
        crate::GIT_HASH
    );

    let app_config = match config::load(args.config_file.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            log_error_with_context(&e, "Loading configuration");
            return 1;
        }
    };

    match args.command {
        Command::Run => commands::run(app_config).await,
        Command::Add { tag, target } => commands::add(&app_config, &tag, &target),
        Command::Remove { tag } => commands::remove(&app_config, &tag),
        Command::List => commands::list(&app_config),
        Command::Status => commands::status(&app_config).await,
    }
}
