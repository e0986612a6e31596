use std::env;
use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use rust_regrip::cli::{list_requested, plugin_from_program_name, Args};
use rust_regrip::config::SourceSpec;
use rust_regrip::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use rust_regrip::dispatch::{Dispatcher, OutputMode};
use rust_regrip::error::{exit_code_for, RegripError};
use rust_regrip::locator::HiveLocator;
use rust_regrip::plugins::build_registry;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };
    process::exit(code);
}

fn run() -> Result<i32> {
    // Invoked through a `reg_<plugin>` symlink?
    let alias = env::args_os()
        .next()
        .and_then(|argv0| plugin_from_program_name(&argv0.to_string_lossy()));

    // Listing ignores every other argument, valid or not
    if list_requested(env::args_os()) {
        print!("{}", build_registry().format_listing());
        return Ok(EXIT_SUCCESS);
    }

    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    let registry = build_registry();

    if args.list {
        print!("{}", registry.format_listing());
        return Ok(EXIT_SUCCESS);
    }

    let plugin_name = args
        .selected_plugin(alias)
        .ok_or(RegripError::NoPluginSpecified)?;

    // Reject unusable source combinations before touching any hive
    let spec = SourceSpec::from_args(&args);
    spec.validate()?;

    let mode = OutputMode::detect(args.pipe);
    let mut dispatcher = Dispatcher::new(&registry, HiveLocator::new(), spec, mode);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = dispatcher.run(&plugin_name, &mut out)?;

    debug!(
        "{}: {} processed, {} skipped, {} failed",
        plugin_name, summary.processed, summary.skipped, summary.failed
    );

    if summary.failed > 0 {
        Ok(EXIT_FAILURE)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}
