use anyhow::Result;

use crate::models::{HiveDeclaration, HiveName};
use crate::plugins::{HiveContext, Plugin, PluginInstance, PluginResult};

/// Reports format version, size and root key of every hive it is given.
#[derive(Debug, Default)]
pub struct HiveInfoPlugin;

impl Plugin for HiveInfoPlugin {
    fn name(&self) -> &'static str {
        "hiveinfo"
    }

    fn description(&self) -> &'static str {
        "Show format version, size and root key name of each hive"
    }

    fn hives(&self) -> HiveDeclaration {
        HiveName::All.into()
    }

    fn instantiate(&self, context: HiveContext) -> Box<dyn PluginInstance> {
        Box::new(HiveInfo { context })
    }
}

struct HiveInfo {
    context: HiveContext,
}

impl PluginInstance for HiveInfo {
    fn context(&self) -> &HiveContext {
        &self.context
    }

    fn run(&mut self) -> Result<Vec<PluginResult>> {
        let hive = &self.context.hive;
        let (major, minor) = hive.version()?;
        let root = hive.root_key_name()?;

        self.context
            .logger
            .debug(&format!("{} is format {}.{}", self.context.path, major, minor));

        Ok(vec![PluginResult::new()
            .with_key(root)
            .with_field("path", self.context.path.to_string())
            .with_field("version", format!("{}.{}", major, minor))
            .with_field("size", hive.len() as u64)])
    }
}
