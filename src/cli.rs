use clap::Parser;
use log::warn;
use std::ffi::OsStr;
use std::path::Path;

use crate::constants::{ALIAS_PREFIX, PROGRAM_NAME};

/// Command-line arguments for regrip.
///
/// Every hive option overrides the hive derived from `--root`, which in turn
/// overrides the matching `REG_*` environment variable. A hive path of `-`
/// reads that hive from standard input.
#[derive(Parser, Debug, Default)]
#[clap(
    name = "regrip",
    version,
    about = "Extract information from Windows Registry hives"
)]
pub struct Args {
    /// Path to the SYSTEM hive. Overrides --root and the REG_SYSTEM environment variable
    #[clap(short = 'y', long, default_value = "")]
    pub system: String,

    /// Path to the SOFTWARE hive. Overrides --root and the REG_SOFTWARE environment variable
    #[clap(short = 'o', long, default_value = "")]
    pub software: String,

    /// Path to the SAM hive. Overrides --root and the REG_SAM environment variable
    #[clap(short = 'a', long, default_value = "")]
    pub sam: String,

    /// Path to the NTUSER.DAT hive. Overrides the REG_NTUSER environment variable
    #[clap(short = 'n', long, default_value = "")]
    pub ntuser: String,

    /// Path to the UsrClass.DAT hive. Overrides the REG_USRCLASS environment variable
    #[clap(short = 'u', long, default_value = "")]
    pub usrclass: String,

    /// Path to the C: folder
    #[clap(short = 'r', long, default_value = "")]
    pub root: String,

    /// Work on all NTUSER.DAT and USRCLASS.DAT hives if required. Requires --root. Overrides --ntuser and --usrclass
    #[clap(long)]
    pub all_user_hives: bool,

    /// Be more verbose
    #[clap(short, long)]
    pub verbose: bool,

    /// Force output in pipe format
    #[clap(short, long)]
    pub pipe: bool,

    /// List available plugins
    #[clap(short, long)]
    pub list: bool,

    /// Name of the plugin to run
    #[clap(value_name = "PLUGIN")]
    pub plugin_name: Option<String>,
}

impl Args {
    /// Plugin selected for this run: the program-name alias wins over the
    /// positional argument.
    pub fn selected_plugin(&self, alias: Option<String>) -> Option<String> {
        if let Some(ignored) = self.overridden_plugin_name(alias.as_deref()) {
            warn!(
                "Invoked as {}, ignoring plugin argument {}",
                alias.as_deref().unwrap_or_default(),
                ignored
            );
        }
        alias.or_else(|| self.plugin_name.clone())
    }

    /// Positional plugin name that an alias takes precedence over, if any.
    pub fn overridden_plugin_name(&self, alias: Option<&str>) -> Option<&str> {
        alias.and(self.plugin_name.as_deref())
    }
}

/// Whether `--list`/`-l` appears anywhere on the command line.
///
/// Checked before full parsing so that listing works whatever else was passed.
/// The first item is the program name and is skipped.
pub fn list_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .skip(1)
        .any(|arg| arg.as_ref() == "--list" || arg.as_ref() == "-l")
}

/// Derives a plugin name from the name the binary was invoked under.
///
/// Returns `None` for the plain `regrip` binary. A symlink named
/// `reg_<plugin>` (or `<plugin>`) selects that plugin directly.
pub fn plugin_from_program_name(argv0: &str) -> Option<String> {
    let file_name = Path::new(argv0).file_name()?.to_string_lossy().to_string();
    let stem = if file_name.to_ascii_lowercase().ends_with(".exe") {
        file_name[..file_name.len() - ".exe".len()].to_string()
    } else {
        file_name
    };

    if stem.is_empty() || stem.eq_ignore_ascii_case(PROGRAM_NAME) {
        return None;
    }

    match stem.strip_prefix(ALIAS_PREFIX) {
        Some(rest) if !rest.is_empty() => Some(rest.to_string()),
        _ => Some(stem),
    }
}
