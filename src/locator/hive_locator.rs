use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::config::{process_env, EnvLookup, SourceSpec};
use crate::constants::{
    NTUSER_FILE_NAME, PROFILE_DIR_CANDIDATES, SYSTEM_CONFIG_SEGMENTS, USRCLASS_SEGMENTS,
};
use crate::error::RegripError;
use crate::locator::path_finder::find_path_nocase;
use crate::models::{HiveName, ResolvedHivePath};

/// Turns logical hive names into the files to open.
///
/// The locator holds no state between calls apart from the environment
/// lookup, so one instance can resolve any number of hives.
pub struct HiveLocator {
    env: Box<dyn EnvLookup>,
}

impl Default for HiveLocator {
    fn default() -> Self {
        HiveLocator { env: process_env() }
    }
}

impl HiveLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `env` instead of the process environment for the last-resort lookup.
    pub fn with_env_lookup(env: Box<dyn EnvLookup>) -> Self {
        HiveLocator { env }
    }

    /// Resolves `hive` to zero or more paths.
    ///
    /// An empty result means the hive is unavailable. Errors are reserved for
    /// configuration problems: all-user-hives mode without a root, or a root
    /// with no profile directory to enumerate.
    pub fn resolve(&self, hive: HiveName, spec: &SourceSpec) -> Result<Vec<ResolvedHivePath>> {
        if hive.involves_user_hives() && spec.all_user_hives() && spec.root().is_none() {
            return Err(RegripError::AllUserHivesWithoutRoot.into());
        }

        let paths = match hive {
            HiveName::System | HiveName::Software | HiveName::Sam => {
                self.resolve_machine_hive(hive, spec).into_iter().collect()
            }
            HiveName::NtUser | HiveName::UsrClass if spec.all_user_hives() => {
                // Checked above
                let root = spec.root().ok_or(RegripError::AllUserHivesWithoutRoot)?;
                self.enumerate_user_hives(hive, root)?
            }
            HiveName::NtUser | HiveName::UsrClass => {
                self.resolve_single_user_hive(hive, spec).into_iter().collect()
            }
            HiveName::All => {
                let mut paths = Vec::new();
                for concrete in HiveName::CONCRETE {
                    let found = self
                        .resolve(concrete, spec)
                        .with_context(|| format!("Failed to resolve {} while expanding ALL", concrete))?;
                    paths.extend(found);
                }
                paths
            }
        };

        debug!("Resolved {} to {} path(s)", hive, paths.len());
        Ok(paths)
    }

    /// SYSTEM, SOFTWARE and SAM: explicit, then `<root>/windows/system32/config/<name>`, then env.
    fn resolve_machine_hive(&self, hive: HiveName, spec: &SourceSpec) -> Option<ResolvedHivePath> {
        if let Some(explicit) = spec.explicit(hive) {
            return Some(ResolvedHivePath::from_value(explicit));
        }

        if let Some(root) = spec.root() {
            let file_name = hive.as_str().to_lowercase();
            let mut segments: Vec<&str> = SYSTEM_CONFIG_SEGMENTS.to_vec();
            segments.push(&file_name);

            if let Some(path) = find_path_nocase(root, &segments) {
                return Some(ResolvedHivePath::File(path));
            }
            debug!("{} not found under {}", hive, root.display());
        }

        self.from_env(hive, spec)
    }

    /// NTUSER.DAT and USRCLASS.DAT without enumeration: explicit, then env.
    fn resolve_single_user_hive(&self, hive: HiveName, spec: &SourceSpec) -> Option<ResolvedHivePath> {
        if let Some(explicit) = spec.explicit(hive) {
            return Some(ResolvedHivePath::from_value(explicit));
        }
        self.from_env(hive, spec)
    }

    fn from_env(&self, hive: HiveName, spec: &SourceSpec) -> Option<ResolvedHivePath> {
        let var = spec.env_var(hive)?;
        let value = self.env.get(var)?;
        debug!("Using {} from environment variable {}", hive, var);
        Some(ResolvedHivePath::from_value(&value))
    }

    /// Walks every profile directory under `root` looking for `hive`.
    fn enumerate_user_hives(&self, hive: HiveName, root: &Path) -> Result<Vec<ResolvedHivePath>> {
        let profiles_dir = find_profiles_dir(root)
            .ok_or_else(|| RegripError::ProfilesDirNotFound(root.to_path_buf()))?;
        debug!("Enumerating user profiles in {}", profiles_dir.display());

        let entries = fs::read_dir(&profiles_dir)
            .with_context(|| format!("Failed to list profiles directory {}", profiles_dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", profiles_dir.display(), e);
                    continue;
                }
            };

            let user_dir = entry.path();
            if !user_dir.is_dir() {
                continue;
            }

            let found = match hive {
                HiveName::NtUser => find_path_nocase(&user_dir, &[NTUSER_FILE_NAME]),
                // Probed relative to the profiles directory itself, once per profile.
                _ => find_path_nocase(&profiles_dir, &USRCLASS_SEGMENTS),
            };

            match found {
                Some(path) => paths.push(ResolvedHivePath::File(path)),
                None => debug!("No {} for profile {}", hive, user_dir.display()),
            }
        }

        Ok(paths)
    }
}

/// First of `Users` / `Documents and Settings` present under `root`.
pub fn find_profiles_dir(root: &Path) -> Option<PathBuf> {
    PROFILE_DIR_CANDIDATES
        .iter()
        .find_map(|candidate| find_path_nocase(root, &[*candidate]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticEnv;
    use crate::test_utils::{create_image_root, create_temp_dir};

    fn locator_with(env: StaticEnv) -> HiveLocator {
        HiveLocator::with_env_lookup(Box::new(env))
    }

    fn file(path: PathBuf) -> ResolvedHivePath {
        ResolvedHivePath::File(path)
    }

    #[test]
    fn test_all_sources_unset_is_empty() {
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default();

        for hive in HiveName::CONCRETE {
            assert!(locator.resolve(hive, &spec).unwrap().is_empty(), "{} should be empty", hive);
        }
        assert!(locator.resolve(HiveName::All, &spec).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_beats_environment() {
        let env = StaticEnv::new()
            .with("REG_SYSTEM", "/env/SYSTEM")
            .with("REG_SOFTWARE", "/env/SOFTWARE")
            .with("REG_SAM", "/env/SAM")
            .with("REG_NTUSER", "/env/NTUSER.DAT")
            .with("REG_USRCLASS", "/env/UsrClass.dat");
        let locator = locator_with(env);

        for hive in HiveName::CONCRETE {
            let explicit = format!("/explicit/{}", hive);
            let spec = SourceSpec::default().with_explicit(hive, &explicit);
            assert_eq!(
                locator.resolve(hive, &spec).unwrap(),
                vec![file(PathBuf::from(&explicit))]
            );
        }
    }

    #[test]
    fn test_environment_is_last_resort() {
        let env = StaticEnv::new().with("REG_SAM", "/env/SAM").with("REG_NTUSER", "/env/NTUSER.DAT");
        let locator = locator_with(env);
        let spec = SourceSpec::default();

        assert_eq!(
            locator.resolve(HiveName::Sam, &spec).unwrap(),
            vec![file(PathBuf::from("/env/SAM"))]
        );
        assert_eq!(
            locator.resolve(HiveName::NtUser, &spec).unwrap(),
            vec![file(PathBuf::from("/env/NTUSER.DAT"))]
        );
    }

    #[test]
    fn test_root_beats_environment() {
        let root = create_image_root(&["Alice"]).unwrap();
        let locator = locator_with(StaticEnv::new().with("REG_SOFTWARE", "/env/SOFTWARE"));
        let spec = SourceSpec::default().with_root(root.path());

        let paths = locator.resolve(HiveName::Software, &spec).unwrap();
        assert_eq!(
            paths,
            vec![file(root.path().join("Windows/System32/config/SOFTWARE"))]
        );
    }

    #[test]
    fn test_root_miss_falls_back_to_environment() {
        let root = create_temp_dir().unwrap();
        let locator = locator_with(StaticEnv::new().with("REG_SYSTEM", "/env/SYSTEM"));
        let spec = SourceSpec::default().with_root(root.path());

        assert_eq!(
            locator.resolve(HiveName::System, &spec).unwrap(),
            vec![file(PathBuf::from("/env/SYSTEM"))]
        );
    }

    #[test]
    fn test_user_hives_ignore_root_without_expansion() {
        let root = create_image_root(&["Alice"]).unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default().with_root(root.path());

        assert!(locator.resolve(HiveName::NtUser, &spec).unwrap().is_empty());
        assert!(locator.resolve(HiveName::UsrClass, &spec).unwrap().is_empty());
    }

    #[test]
    fn test_all_user_hives_without_root_is_an_error() {
        let locator = locator_with(StaticEnv::new().with("REG_NTUSER", "/env/NTUSER.DAT"));
        let spec = SourceSpec::default().with_all_user_hives(true);

        for hive in [HiveName::NtUser, HiveName::UsrClass, HiveName::All] {
            let err = locator.resolve(hive, &spec).unwrap_err();
            assert_eq!(
                err.downcast_ref::<RegripError>(),
                Some(&RegripError::AllUserHivesWithoutRoot)
            );
        }

        // Machine hives are unaffected
        assert!(locator.resolve(HiveName::System, &spec).unwrap().is_empty());
    }

    #[test]
    fn test_enumerate_ntuser_per_profile() {
        let root = create_image_root(&["Alice", "Bob"]).unwrap();
        // Files next to the profiles are skipped
        fs::write(root.path().join("Users/desktop.ini"), b"").unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default().with_root(root.path()).with_all_user_hives(true);

        let mut paths = locator.resolve(HiveName::NtUser, &spec).unwrap();
        paths.sort_by_key(|p| p.to_string());
        assert_eq!(
            paths,
            vec![
                file(root.path().join("Users/Alice/NTUSER.DAT")),
                file(root.path().join("Users/Bob/NTUSER.DAT")),
            ]
        );
    }

    #[test]
    fn test_expansion_overrides_explicit_user_hive() {
        let root = create_image_root(&["Alice"]).unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default()
            .with_root(root.path())
            .with_explicit(HiveName::NtUser, "/explicit/NTUSER.DAT")
            .with_all_user_hives(true);

        assert_eq!(
            locator.resolve(HiveName::NtUser, &spec).unwrap(),
            vec![file(root.path().join("Users/Alice/NTUSER.DAT"))]
        );
    }

    #[test]
    fn test_documents_and_settings_fallback() {
        let root = create_temp_dir().unwrap();
        let profile = root.path().join("Documents and Settings/Administrator");
        fs::create_dir_all(&profile).unwrap();
        fs::write(profile.join("NTUSER.DAT"), b"hive").unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default().with_root(root.path()).with_all_user_hives(true);

        assert_eq!(
            locator.resolve(HiveName::NtUser, &spec).unwrap(),
            vec![file(profile.join("NTUSER.DAT"))]
        );
    }

    #[test]
    fn test_missing_profiles_dir_is_fatal() {
        let root = create_temp_dir().unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default().with_root(root.path()).with_all_user_hives(true);

        let err = locator.resolve(HiveName::NtUser, &spec).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegripError>(),
            Some(RegripError::ProfilesDirNotFound(_))
        ));
    }

    #[test]
    fn test_usrclass_probed_under_profiles_dir() {
        let root = create_image_root(&["Alice", "Bob"]).unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default().with_root(root.path()).with_all_user_hives(true);

        // Per-profile UsrClass.dat files are not where the lookup goes
        assert!(locator.resolve(HiveName::UsrClass, &spec).unwrap().is_empty());

        let shared = root.path().join("Users/AppData/Local/Microsoft/Windows");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("UsrClass.dat"), b"hive").unwrap();

        // One hit per directory under Users, AppData itself included
        let paths = locator.resolve(HiveName::UsrClass, &spec).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| *p == file(shared.join("UsrClass.dat"))));
    }

    #[test]
    fn test_resolve_all_counts_and_order() {
        let root = create_image_root(&["Alice", "Bob"]).unwrap();
        let locator = locator_with(StaticEnv::new());
        let spec = SourceSpec::default().with_root(root.path()).with_all_user_hives(true);

        let paths = locator.resolve(HiveName::All, &spec).unwrap();
        assert_eq!(paths.len(), 5);

        let config = root.path().join("Windows/System32/config");
        assert_eq!(paths[0], file(config.join("SYSTEM")));
        assert_eq!(paths[1], file(config.join("SOFTWARE")));
        assert_eq!(paths[2], file(config.join("SAM")));

        let mut users: Vec<String> = paths[3..].iter().map(|p| p.to_string()).collect();
        users.sort();
        assert_eq!(
            users,
            vec![
                root.path().join("Users/Alice/NTUSER.DAT").display().to_string(),
                root.path().join("Users/Bob/NTUSER.DAT").display().to_string(),
            ]
        );
    }

    #[test]
    fn test_miss_does_not_affect_next_resolution() {
        let locator = locator_with(StaticEnv::new());

        let missing = SourceSpec::default();
        assert!(locator.resolve(HiveName::Sam, &missing).unwrap().is_empty());

        let present = SourceSpec::default().with_explicit(HiveName::System, "/evidence/SYSTEM");
        assert_eq!(
            locator.resolve(HiveName::System, &present).unwrap(),
            vec![file(PathBuf::from("/evidence/SYSTEM"))]
        );
        assert!(locator.resolve(HiveName::Sam, &missing).unwrap().is_empty());
    }

    #[test]
    fn test_stdin_sentinel_from_explicit_and_env() {
        let locator = locator_with(StaticEnv::new().with("REG_SOFTWARE", "-"));
        let spec = SourceSpec::default().with_explicit(HiveName::System, "-");

        assert_eq!(locator.resolve(HiveName::System, &spec).unwrap(), vec![ResolvedHivePath::Stdin]);
        assert_eq!(locator.resolve(HiveName::Software, &spec).unwrap(), vec![ResolvedHivePath::Stdin]);
    }
}
