use std::io::Write;

use anyhow::Result;

use crate::models::{HiveDeclaration, HiveName};
use crate::plugins::{HiveContext, Plugin, PluginInstance, PluginResult};

/// Lists the per-user hives together with the profile they belong to.
#[derive(Debug, Default)]
pub struct UserHivesPlugin;

impl Plugin for UserHivesPlugin {
    fn name(&self) -> &'static str {
        "userhives"
    }

    fn description(&self) -> &'static str {
        "List NTUSER.DAT and USRCLASS.DAT hives with their profile and root key"
    }

    fn hives(&self) -> HiveDeclaration {
        vec![HiveName::NtUser, HiveName::UsrClass].into()
    }

    fn instantiate(&self, context: HiveContext) -> Box<dyn PluginInstance> {
        Box::new(UserHives { context })
    }
}

struct UserHives {
    context: HiveContext,
}

impl PluginInstance for UserHives {
    fn context(&self) -> &HiveContext {
        &self.context
    }

    fn run(&mut self) -> Result<Vec<PluginResult>> {
        let root = self.context.hive.root_key_name()?;

        Ok(vec![PluginResult::new()
            .with_key(root)
            .with_field("hive", self.context.hive_name.as_str())
            .with_field("profile", self.context.guess_username())
            .with_field("path", self.context.path.to_string())])
    }

    fn display_human(&self, result: &PluginResult, out: &mut dyn Write) -> Result<()> {
        let field = |name: &str| {
            result
                .custom
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        writeln!(
            out,
            "{:<13} {:<20} {}",
            field("hive"),
            field("profile"),
            field("path")
        )?;
        Ok(())
    }
}
