use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::constants::STDIN_SENTINEL;

/// Logical name of a registry hive.
///
/// `All` never names a file. It expands to the five concrete hives when
/// paths are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HiveName {
    System,
    Software,
    Sam,
    NtUser,
    UsrClass,
    All,
}

impl HiveName {
    /// Concrete hives in the order `All` expands to
    pub const CONCRETE: [HiveName; 5] = [
        HiveName::System,
        HiveName::Software,
        HiveName::Sam,
        HiveName::NtUser,
        HiveName::UsrClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HiveName::System => "SYSTEM",
            HiveName::Software => "SOFTWARE",
            HiveName::Sam => "SAM",
            HiveName::NtUser => "NTUSER.DAT",
            HiveName::UsrClass => "USRCLASS.DAT",
            HiveName::All => "ALL",
        }
    }

    /// Per-user hives live in profile directories rather than `system32\config`.
    pub fn is_user_hive(&self) -> bool {
        matches!(self, HiveName::NtUser | HiveName::UsrClass)
    }

    /// Whether resolving this name can touch the per-user enumeration.
    pub fn involves_user_hives(&self) -> bool {
        self.is_user_hive() || *self == HiveName::All
    }
}

impl fmt::Display for HiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HiveName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(HiveName::System),
            "software" => Ok(HiveName::Software),
            "sam" => Ok(HiveName::Sam),
            "ntuser.dat" | "ntuser" => Ok(HiveName::NtUser),
            "usrclass.dat" | "usrclass" => Ok(HiveName::UsrClass),
            "all" => Ok(HiveName::All),
            _ => Err(anyhow!("Unknown hive name: {}", s)),
        }
    }
}

/// What a plugin says it needs, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiveDeclaration {
    One(HiveName),
    Many(Vec<HiveName>),
}

impl From<HiveName> for HiveDeclaration {
    fn from(hive: HiveName) -> Self {
        HiveDeclaration::One(hive)
    }
}

impl From<Vec<HiveName>> for HiveDeclaration {
    fn from(hives: Vec<HiveName>) -> Self {
        HiveDeclaration::Many(hives)
    }
}

/// Ordered, duplicate-free set of hive names required by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveSet(Vec<HiveName>);

impl HiveSet {
    pub fn iter(&self) -> impl Iterator<Item = HiveName> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, hive: HiveName) -> bool {
        self.0.contains(&hive)
    }
}

impl From<HiveDeclaration> for HiveSet {
    fn from(declaration: HiveDeclaration) -> Self {
        match declaration {
            HiveDeclaration::One(hive) => HiveSet(vec![hive]),
            HiveDeclaration::Many(hives) => {
                let mut set = Vec::with_capacity(hives.len());
                for hive in hives {
                    if !set.contains(&hive) {
                        set.push(hive);
                    }
                }
                HiveSet(set)
            }
        }
    }
}

impl fmt::Display for HiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(HiveName::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Where one hive will be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedHivePath {
    File(PathBuf),
    Stdin,
}

impl ResolvedHivePath {
    /// Interprets a user-supplied path value, honoring the `-` sentinel.
    pub fn from_value(value: &str) -> Self {
        if value == STDIN_SENTINEL {
            ResolvedHivePath::Stdin
        } else {
            ResolvedHivePath::File(PathBuf::from(value))
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, ResolvedHivePath::Stdin)
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ResolvedHivePath::File(path) => Some(path),
            ResolvedHivePath::Stdin => None,
        }
    }
}

impl fmt::Display for ResolvedHivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedHivePath::File(path) => write!(f, "{}", path.display()),
            ResolvedHivePath::Stdin => f.write_str(STDIN_SENTINEL),
        }
    }
}
