use std::io::{self, Read, Write};

use anyhow::{Context, Result};

use crate::config::SourceSpec;
use crate::dispatch::render::{render, OutputMode};
use crate::error::RegripError;
use crate::hive::RegistryHive;
use crate::locator::HiveLocator;
use crate::models::{HiveName, ResolvedHivePath};
use crate::plugins::{HiveContext, HiveLogger, PluginDescriptor, PluginRegistry};

/// Outcome counters for one dispatcher run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// (hive, path) pairs whose results were rendered
    pub processed: usize,
    /// Declared hives for which no path was found
    pub skipped: usize,
    /// (hive, path) pairs that failed to open, run or render
    pub failed: usize,
}

/// Runs one plugin against every hive it declares.
///
/// Each (hive, path) pair is handled on its own: a missing hive is skipped
/// with a warning and a hive that fails to open or run is logged and
/// counted, while the remaining pairs are still processed.
pub struct Dispatcher<'a> {
    registry: &'a PluginRegistry,
    locator: HiveLocator,
    spec: SourceSpec,
    mode: OutputMode,
    logger: HiveLogger,
    stdin: Option<Box<dyn Read>>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a PluginRegistry, locator: HiveLocator, spec: SourceSpec, mode: OutputMode) -> Self {
        Dispatcher {
            registry,
            locator,
            spec,
            mode,
            logger: HiveLogger::default(),
            stdin: Some(Box::new(io::stdin())),
        }
    }

    /// Source used for hives given as `-`. It is read at most once.
    pub fn with_stdin(mut self, reader: Box<dyn Read>) -> Self {
        self.stdin = Some(reader);
        self
    }

    pub fn with_logger(mut self, logger: HiveLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Loads `plugin_name`, resolves its hives and renders every result to `out`.
    ///
    /// Fails only on configuration errors: unknown plugin, all-user-hives
    /// mode without a root, or no profile directory to enumerate.
    pub fn run(&mut self, plugin_name: &str, out: &mut dyn Write) -> Result<DispatchSummary> {
        let registry = self.registry;
        let descriptor = registry.load(plugin_name)?;

        if self.spec.all_user_hives()
            && self.spec.root().is_none()
            && descriptor.hives.iter().any(|hive| hive.involves_user_hives())
        {
            return Err(RegripError::AllUserHivesWithoutRoot.into());
        }

        let logger = self.logger.for_plugin(descriptor.name);
        self.logger.debug(&format!(
            "Running {} on {} ({:?} output)",
            descriptor.name, descriptor.hives, self.mode
        ));

        let mut summary = DispatchSummary::default();
        for hive_name in descriptor.hives.iter() {
            let paths = self
                .locator
                .resolve(hive_name, &self.spec)
                .with_context(|| format!("Failed to locate {}", hive_name))?;

            if paths.is_empty() {
                self.logger.warn(&format!("Hive not found: {}", hive_name));
                summary.skipped += 1;
                continue;
            }

            let single = paths.len() == 1;
            for path in paths {
                match self.process(descriptor, hive_name, &path, single, &logger, out) {
                    Ok(()) => summary.processed += 1,
                    Err(e) => {
                        self.logger
                            .error(&format!("Failed to process {} from {}: {:#}", hive_name, path, e));
                        summary.failed += 1;
                    }
                }
            }
        }

        self.logger.debug(&format!("{} finished: {:?}", descriptor.name, summary));
        Ok(summary)
    }

    /// Opens one hive, runs the plugin on it and renders its results.
    ///
    /// The hive is dropped when this returns, whatever the outcome.
    fn process(
        &mut self,
        descriptor: &PluginDescriptor,
        hive_name: HiveName,
        path: &ResolvedHivePath,
        single: bool,
        logger: &HiveLogger,
        out: &mut dyn Write,
    ) -> Result<()> {
        let hive = self.open(path, single)?;

        let mut instance = descriptor.instantiate(HiveContext {
            hive,
            logger: logger.clone(),
            hive_name,
            path: path.clone(),
        });

        let results = instance
            .run()
            .with_context(|| format!("Plugin {} failed", descriptor.name))?;

        if !results.is_empty() && hive_name == HiveName::NtUser && !path.is_stdin() {
            instance.info(&format!("User: {}", instance.guess_username()));
        }

        for result in &results {
            render(instance.as_ref(), result, self.mode, out)?;
        }
        out.flush()?;

        Ok(())
    }

    fn open(&mut self, path: &ResolvedHivePath, single: bool) -> Result<RegistryHive> {
        match path {
            ResolvedHivePath::File(file) => RegistryHive::open(file),
            ResolvedHivePath::Stdin => {
                if !single {
                    return Err(RegripError::StdinUnavailable(
                        "more than one hive resolved for this request".to_string(),
                    )
                    .into());
                }
                let mut reader = self.stdin.take().ok_or_else(|| {
                    RegripError::StdinUnavailable("already consumed by an earlier hive".to_string())
                })?;
                RegistryHive::from_reader(&mut reader).context("Failed to load hive from standard input")
            }
        }
    }
}
