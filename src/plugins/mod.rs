//! Analysis plugins and the contract they implement.
//!
//! A [`Plugin`] is a factory registered under a unique name. It declares the
//! hive(s) it needs and, for every opened hive, produces a
//! [`PluginInstance`] that yields [`PluginResult`] records.
//!
//! ```text
//! PluginRegistry ──load(name)──▶ PluginDescriptor ──instantiate(ctx)──▶ PluginInstance
//!                                     │ hives: HiveSet                       │ run()
//!                                     ▼                                      ▼
//!                                HiveLocator                         display_human / display_machine
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::constants::{PLUGIN_LOG_TARGET_PREFIX, UNKNOWN_USER};
use crate::hive::RegistryHive;
use crate::models::{HiveDeclaration, HiveName, HiveSet, ResolvedHivePath};

/// Plugin registration table and lookup
pub mod registry;

/// Header summary for any hive
pub mod hiveinfo;

/// Per-user hive summary
pub mod userhives;

pub use registry::{build_registry, PluginRegistry, PluginSummary};

/// Logging handle given to the dispatcher and to every plugin instance.
///
/// Records go through the process-wide `log` sink, tagged with a target
/// naming the emitter so they can be filtered per plugin.
#[derive(Debug, Clone)]
pub struct HiveLogger {
    target: String,
}

impl Default for HiveLogger {
    fn default() -> Self {
        HiveLogger {
            target: PLUGIN_LOG_TARGET_PREFIX.to_string(),
        }
    }
}

impl HiveLogger {
    /// Handle for records emitted by `plugin`
    pub fn for_plugin(&self, plugin: &str) -> Self {
        HiveLogger {
            target: format!("{}::{}", self.target, plugin),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn debug(&self, msg: &str) {
        log::debug!(target: self.target.as_str(), "{}", msg);
    }

    pub fn info(&self, msg: &str) {
        log::info!(target: self.target.as_str(), "{}", msg);
    }

    pub fn warn(&self, msg: &str) {
        log::warn!(target: self.target.as_str(), "{}", msg);
    }

    pub fn error(&self, msg: &str) {
        log::error!(target: self.target.as_str(), "{}", msg);
    }
}

/// Everything a plugin instance is bound to.
pub struct HiveContext {
    pub hive: RegistryHive,
    pub logger: HiveLogger,
    pub hive_name: HiveName,
    pub path: ResolvedHivePath,
}

impl HiveContext {
    /// Name of the directory holding the hive file.
    ///
    /// For per-user hives this is the profile directory, which is the best
    /// available guess at the account name.
    pub fn guess_username(&self) -> String {
        self.path
            .as_path()
            .and_then(|path| path.parent())
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }
}

/// One record produced by a plugin run.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct PluginResult {
    /// Registry key the record refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value name below `key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    /// Value data, already rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_data: Option<String>,
    /// Plugin-specific fields
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, Value>,
}

impl PluginResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, data: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self.value_data = Some(data.into());
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.custom.insert(name.to_string(), value.into());
        self
    }
}

impl fmt::Display for PluginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        match (&self.key, &self.value_name) {
            (Some(key), Some(name)) => parts.push(format!("{}\\{}", key, name)),
            (Some(key), None) => parts.push(key.clone()),
            (None, Some(name)) => parts.push(name.clone()),
            (None, None) => {}
        }
        if let Some(data) = &self.value_data {
            parts.push(format!("= {}", data));
        }
        for (name, value) in &self.custom {
            match value {
                Value::String(s) => parts.push(format!("{}: {}", name, s)),
                other => parts.push(format!("{}: {}", name, other)),
            }
        }

        f.write_str(&parts.join("  "))
    }
}

/// A named analyzer, registered once and instantiated per opened hive.
pub trait Plugin: Send + Sync {
    /// Unique name the plugin is selected by.
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of this plugin.
    fn description(&self) -> &'static str {
        "No description provided."
    }

    /// Hive(s) the plugin needs. A single hive is normalized to a one-element set on registration.
    fn hives(&self) -> HiveDeclaration;

    /// Binds a new instance to one opened hive.
    fn instantiate(&self, context: HiveContext) -> Box<dyn PluginInstance>;
}

/// A plugin bound to one opened hive.
///
/// Only [`PluginInstance::run`] and [`PluginInstance::context`] must be
/// implemented; rendering, logging and the username guess have defaults.
pub trait PluginInstance {
    fn context(&self) -> &HiveContext;

    /// Produces all records for the bound hive.
    fn run(&mut self) -> Result<Vec<PluginResult>>;

    /// Renders one record for a terminal.
    fn display_human(&self, result: &PluginResult, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", result)?;
        Ok(())
    }

    /// Renders one record for another program: one JSON object per line.
    fn display_machine(&self, result: &PluginResult, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer(&mut *out, result)?;
        writeln!(out)?;
        Ok(())
    }

    fn info(&self, msg: &str) {
        self.context().logger.info(msg);
    }

    /// Account the bound hive belongs to; meaningful for NTUSER.DAT only.
    fn guess_username(&self) -> String {
        self.context().guess_username()
    }
}

/// A registered plugin with its hive declaration normalized.
#[derive(Clone)]
pub struct PluginDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub hives: HiveSet,
    factory: Arc<dyn Plugin>,
}

impl PluginDescriptor {
    pub fn new(plugin: Arc<dyn Plugin>) -> Self {
        PluginDescriptor {
            name: plugin.name(),
            description: plugin.description(),
            hives: HiveSet::from(plugin.hives()),
            factory: plugin,
        }
    }

    pub fn instantiate(&self, context: HiveContext) -> Box<dyn PluginInstance> {
        self.factory.instantiate(context)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("hives", &self.hives)
            .finish()
    }
}
