//! Hive path resolution.
//!
//! [`HiveLocator`] applies the source priority chain for each hive kind
//! (explicit path, then the path under the mounted root, then the
//! environment) and enumerates user profiles for the per-user hives.
//! [`path_finder`] does the case-insensitive directory walking underneath.

/// Case-insensitive directory entry and path lookup
pub mod path_finder;

/// Logical hive name to file path resolution
pub mod hive_locator;

pub use hive_locator::{find_profiles_dir, HiveLocator};
