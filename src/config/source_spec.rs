use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use crate::cli::Args;
use crate::constants::{ENV_NTUSER, ENV_SAM, ENV_SOFTWARE, ENV_SYSTEM, ENV_USRCLASS};
use crate::error::RegripError;
use crate::models::HiveName;

/// Where each hive kind may come from.
///
/// Per hive kind the sources are tried in order: explicit override, path
/// derived from `root`, environment variable. Per-user hives have no
/// root-derived path unless `all_user_hives` is set, in which case they are
/// enumerated from the profile directories under `root`.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    explicit: HashMap<HiveName, String>,
    env_vars: HashMap<HiveName, String>,
    root: Option<PathBuf>,
    all_user_hives: bool,
}

impl Default for SourceSpec {
    fn default() -> Self {
        let env_vars = [
            (HiveName::System, ENV_SYSTEM),
            (HiveName::Software, ENV_SOFTWARE),
            (HiveName::Sam, ENV_SAM),
            (HiveName::NtUser, ENV_NTUSER),
            (HiveName::UsrClass, ENV_USRCLASS),
        ]
        .into_iter()
        .map(|(hive, name)| (hive, name.to_string()))
        .collect();

        SourceSpec {
            explicit: HashMap::new(),
            env_vars,
            root: None,
            all_user_hives: false,
        }
    }
}

impl SourceSpec {
    /// Builds the source configuration from parsed command line arguments.
    pub fn from_args(args: &Args) -> Self {
        let spec = SourceSpec::default()
            .with_explicit(HiveName::System, &args.system)
            .with_explicit(HiveName::Software, &args.software)
            .with_explicit(HiveName::Sam, &args.sam)
            .with_explicit(HiveName::NtUser, &args.ntuser)
            .with_explicit(HiveName::UsrClass, &args.usrclass)
            .with_root(&args.root)
            .with_all_user_hives(args.all_user_hives);

        debug!("Hive sources: {:?}", spec);
        spec
    }

    /// Sets the explicit path for one hive kind. Empty values are ignored.
    pub fn with_explicit(mut self, hive: HiveName, path: &str) -> Self {
        if hive != HiveName::All && !path.is_empty() {
            self.explicit.insert(hive, path.to_string());
        }
        self
    }

    /// Sets the filesystem root. An empty value clears it.
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        let root = root.as_ref();
        self.root = if root.as_os_str().is_empty() {
            None
        } else {
            Some(root.to_path_buf())
        };
        self
    }

    pub fn with_all_user_hives(mut self, enabled: bool) -> Self {
        self.all_user_hives = enabled;
        self
    }

    pub fn explicit(&self, hive: HiveName) -> Option<&str> {
        self.explicit.get(&hive).map(String::as_str)
    }

    pub fn env_var(&self, hive: HiveName) -> Option<&str> {
        self.env_vars.get(&hive).map(String::as_str)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn all_user_hives(&self) -> bool {
        self.all_user_hives
    }

    /// Rejects `--all-user-hives` without `--root`.
    pub fn validate(&self) -> Result<()> {
        if self.all_user_hives && self.root.is_none() {
            return Err(RegripError::AllUserHivesWithoutRoot.into());
        }
        Ok(())
    }
}
