//! # regrip
//!
//! Locate Windows Registry hives on a mounted disk image (or a live system)
//! and run named analysis plugins against them.
//!
//! ## Overview
//!
//! Investigators usually know *what* they want out of the registry ("which
//! users exist", "what ran at logon") but not where each hive sits on the
//! image they mounted, or in which casing. regrip resolves the hive files a
//! plugin needs and feeds each of them to the plugin, streaming the results
//! either as text or as one JSON object per line.
//!
//! ## Features
//!
//! - **Source priority**: explicit path, then the path under `--root`, then
//!   the `REG_*` environment variable
//! - **Case-insensitive lookup**: Windows path semantics on case-sensitive mounts
//! - **All user hives**: enumerate every profile under `Users` or
//!   `Documents and Settings`
//! - **Standard input**: a single hive can be piped in as `-`
//! - **Pipe detection**: machine-readable output when stdout is redirected
//!
//! ## Usage
//!
//! ```no_run
//! use rust_regrip::config::SourceSpec;
//! use rust_regrip::dispatch::{Dispatcher, OutputMode};
//! use rust_regrip::locator::HiveLocator;
//! use rust_regrip::plugins::build_registry;
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = build_registry();
//! let spec = SourceSpec::default().with_root("/mnt/evidence").with_all_user_hives(true);
//!
//! let mut dispatcher = Dispatcher::new(&registry, HiveLocator::new(), spec, OutputMode::Human);
//! let summary = dispatcher.run("userhives", &mut std::io::stdout())?;
//!
//! println!("Processed {} hives", summary.processed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and alias handling
//! - [`models`]: Hive names, hive sets and resolved paths
//! - [`config`]: Hive source configuration and environment lookups
//! - [`locator`]: Case-insensitive hive path resolution
//! - [`hive`]: Loading and validating hive files
//! - [`plugins`]: Plugin contract, registry and built-in plugins
//! - [`dispatch`]: Running a plugin and rendering its results
//! - [`error`]: Errors that select the process exit code
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Hive source configuration
pub mod config;

/// Hive path resolution
pub mod locator;

/// Opened registry hives
pub mod hive;

/// Plugin contract, registry and built-in plugins
pub mod plugins;

/// Plugin dispatch and rendering
pub mod dispatch;

/// Errors mapped to exit codes
pub mod error;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
