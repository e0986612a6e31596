//! Global constants for the regrip application.
//!
//! Hive locations, environment variable names and process exit codes live
//! here so the locator, the dispatcher and `main` agree on them.

// Program naming
/// Program name under which no alias lookup happens
pub const PROGRAM_NAME: &str = "regrip";

/// Prefix stripped from alias names (`reg_hiveinfo` runs `hiveinfo`)
pub const ALIAS_PREFIX: &str = "reg_";

// Hive locations, relative to the filesystem root
/// Directory holding the machine hives
pub const SYSTEM_CONFIG_SEGMENTS: [&str; 3] = ["windows", "system32", "config"];

/// Candidate user profile directories, in lookup order
pub const PROFILE_DIR_CANDIDATES: [&str; 2] = ["Users", "Documents and Settings"];

/// File name of the per-user NTUSER hive
pub const NTUSER_FILE_NAME: &str = "ntuser.dat";

/// Location of the USRCLASS hive below the profiles directory
pub const USRCLASS_SEGMENTS: [&str; 5] = ["appdata", "local", "microsoft", "windows", "usrclass.dat"];

/// Path value meaning "read the hive from standard input"
pub const STDIN_SENTINEL: &str = "-";

// Environment variables consulted as the last resort
pub const ENV_SYSTEM: &str = "REG_SYSTEM";
pub const ENV_SOFTWARE: &str = "REG_SOFTWARE";
pub const ENV_SAM: &str = "REG_SAM";
pub const ENV_NTUSER: &str = "REG_NTUSER";
pub const ENV_USRCLASS: &str = "REG_USRCLASS";

// Exit codes
/// Run completed
pub const EXIT_SUCCESS: i32 = 0;

/// Fatal error, or at least one hive failed to open or run
pub const EXIT_FAILURE: i32 = 1;

/// Command line could not be used (no plugin named)
pub const EXIT_USAGE: i32 = 2;

/// `--all-user-hives` given without `--root`
pub const EXIT_ALL_USER_HIVES_WITHOUT_ROOT: i32 = 3;

/// Requested plugin is not registered
pub const EXIT_PLUGIN_NOT_FOUND: i32 = 4;

// Logging
/// Target prefix for records emitted by plugins
pub const PLUGIN_LOG_TARGET_PREFIX: &str = "regrip";

/// Fallback when no subject can be derived from a hive path
pub const UNKNOWN_USER: &str = "unknown";
