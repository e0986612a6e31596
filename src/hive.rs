//! Opened registry hives.
//!
//! A hive is read fully into memory when opened, so the underlying file
//! handle is closed before any plugin runs. Decoding is left to `nt-hive`;
//! this module only checks the base block.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, warn};
use nt_hive::{Hive, HiveMinorVersion, NtHiveError};

/// Size of the base block preceding the hive bins
const BASE_BLOCK_SIZE: usize = 4096;

// Base block field offsets
const MAJOR_VERSION_OFFSET: usize = 20;
const MINOR_VERSION_OFFSET: usize = 24;
const FILE_TYPE_OFFSET: usize = 28;
const FILE_FORMAT_OFFSET: usize = 32;
const DATA_SIZE_OFFSET: usize = 40;
const CLUSTERING_FACTOR_OFFSET: usize = 44;
const CHECKSUM_OFFSET: usize = 508;

/// Hive bytes that passed header validation.
pub struct RegistryHive {
    bytes: Vec<u8>,
}

impl RegistryHive {
    /// Reads and validates the hive at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open hive {}", path.display()))?;
        let hive = Self::from_reader(&mut file)
            .with_context(|| format!("Failed to load hive {}", path.display()))?;
        debug!("Loaded {} bytes from {}", hive.len(), path.display());
        Ok(hive)
    }

    /// Reads and validates a hive from any byte stream (standard input).
    pub fn from_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .context("Failed to read hive data")?;
        Self::from_bytes(bytes)
    }

    /// Validates the base block of `bytes`.
    ///
    /// Hives copied off a running system are often not fully flushed, which
    /// leaves the two sequence numbers apart. Such a hive is accepted with a
    /// warning as long as the rest of the base block checks out.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let validation = Hive::without_validation(bytes.as_slice())
            .map_err(|e| anyhow!("Invalid hive: {}", e))?
            .validate();

        match validation {
            Ok(()) => {}
            Err(NtHiveError::SequenceNumberMismatch { primary, secondary }) => {
                warn!(
                    "Hive was not cleanly written (sequence numbers {} and {}), reading it as-is",
                    primary, secondary
                );
                check_base_block(&bytes)?;
            }
            Err(e) => bail!("Invalid hive: {}", e),
        }

        Ok(RegistryHive { bytes })
    }

    /// Decoded view of the hive.
    ///
    /// The header was validated on open; this re-borrows the bytes.
    pub fn parse(&self) -> Result<Hive<&[u8]>> {
        Hive::without_validation(self.bytes.as_slice()).map_err(|e| anyhow!("Invalid hive: {}", e))
    }

    /// Name of the root key, as stored in the hive.
    pub fn root_key_name(&self) -> Result<String> {
        let hive = self.parse()?;
        let root = hive
            .root_key_node()
            .map_err(|e| anyhow!("Failed to read root key: {}", e))?;
        let name = root
            .name()
            .map_err(|e| anyhow!("Failed to read root key name: {}", e))?;
        Ok(name.to_string_lossy())
    }

    /// `(major, minor)` format version from the base block.
    pub fn version(&self) -> Result<(u32, u32)> {
        let hive = self.parse()?;
        Ok((hive.major_version(), hive.minor_version()))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Base block checks that `Hive::validate` runs after the sequence numbers.
fn check_base_block(bytes: &[u8]) -> Result<()> {
    let (major, minor) = (read_u32(bytes, MAJOR_VERSION_OFFSET), read_u32(bytes, MINOR_VERSION_OFFSET));
    if major != 1 || minor < HiveMinorVersion::WindowsNT4 as u32 {
        bail!("Invalid hive: unsupported version {}.{}", major, minor);
    }

    let file_type = read_u32(bytes, FILE_TYPE_OFFSET);
    if file_type != 0 {
        bail!("Invalid hive: not a primary hive file (type {})", file_type);
    }

    let file_format = read_u32(bytes, FILE_FORMAT_OFFSET);
    if file_format != 1 {
        bail!("Invalid hive: unsupported file format {}", file_format);
    }

    let data_size = read_u32(bytes, DATA_SIZE_OFFSET) as usize;
    if data_size % BASE_BLOCK_SIZE != 0 || data_size > bytes.len() - BASE_BLOCK_SIZE {
        bail!(
            "Invalid hive: data size {} does not fit the {} bytes after the base block",
            data_size,
            bytes.len() - BASE_BLOCK_SIZE
        );
    }

    let clustering_factor = read_u32(bytes, CLUSTERING_FACTOR_OFFSET);
    if clustering_factor != 1 {
        bail!("Invalid hive: unsupported clustering factor {}", clustering_factor);
    }

    let stored = read_u32(bytes, CHECKSUM_OFFSET);
    let calculated = base_block_checksum(bytes);
    if stored != calculated {
        bail!("Invalid hive: base block checksum {:#010x}, expected {:#010x}", stored, calculated);
    }

    Ok(())
}

/// XOR-32 over the base block bytes preceding the checksum field.
fn base_block_checksum(bytes: &[u8]) -> u32 {
    let checksum = bytes[..CHECKSUM_OFFSET]
        .chunks_exact(4)
        .fold(0u32, |acc, dword| acc ^ u32::from_le_bytes([dword[0], dword[1], dword[2], dword[3]]));

    match checksum {
        0 => 1,
        u32::MAX => u32::MAX - 1,
        other => other,
    }
}

/// Callers have already checked that a full base block is present.
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}
