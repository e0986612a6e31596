use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};

use crate::error::RegripError;
use crate::models::HiveSet;
use crate::plugins::{hiveinfo, userhives, Plugin, PluginDescriptor};

/// Listing entry for one registered plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSummary {
    pub name: &'static str,
    pub hives: HiveSet,
    pub description: &'static str,
}

/// Name → plugin lookup, ordered by name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<&'static str, PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `plugin`, replacing any earlier plugin with the same name.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        let descriptor = PluginDescriptor::new(plugin);
        debug!("Registering plugin {} ({})", descriptor.name, descriptor.hives);

        if let Some(previous) = self.plugins.insert(descriptor.name, descriptor) {
            warn!("Plugin {} registered twice, keeping the last one", previous.name);
        }
    }

    pub fn list(&self) -> Vec<PluginSummary> {
        self.plugins
            .values()
            .map(|descriptor| PluginSummary {
                name: descriptor.name,
                hives: descriptor.hives.clone(),
                description: descriptor.description,
            })
            .collect()
    }

    /// One `- name(HIVES): description` line per plugin.
    pub fn format_listing(&self) -> String {
        self.list()
            .iter()
            .map(|p| format!("- {}({}): {}\n", p.name, p.hives, p.description))
            .collect()
    }

    pub fn load(&self, name: &str) -> Result<&PluginDescriptor> {
        self.plugins
            .get(name)
            .ok_or_else(|| RegripError::PluginNotFound(name.to_string()).into())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Registry holding every plugin compiled into the binary.
pub fn build_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    registry.register(Arc::new(hiveinfo::HiveInfoPlugin::default()));
    registry.register(Arc::new(userhives::UserHivesPlugin::default()));

    registry
}
