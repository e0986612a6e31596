//! Test utilities for regrip
//!
//! Temporary directory trees shaped like a mounted Windows volume, and
//! minimal hive files that pass header validation.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

/// Size of the hive base block and of one hive bin
const BLOCK_SIZE: usize = 4096;

/// Size of the fixed part of a key node cell
const KEY_NODE_HEADER_SIZE: usize = 76;

/// Offset of the root cell inside the hive data (right after the hbin header)
const ROOT_CELL_OFFSET: usize = 0x20;

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a temporary file with the given content
pub fn create_temp_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    use std::io::Write;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Builds the smallest hive that validates: a base block plus one bin
/// holding a root key named `root_name` without subkeys or values.
pub fn minimal_hive_bytes(root_name: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; BLOCK_SIZE * 2];

    // Base block
    bytes[0..4].copy_from_slice(b"regf");
    put_u32(&mut bytes, 4, 1); // primary sequence number
    put_u32(&mut bytes, 8, 1); // secondary sequence number
    put_u32(&mut bytes, 20, 1); // major version
    put_u32(&mut bytes, 24, 5); // minor version
    put_u32(&mut bytes, 28, 0); // primary file
    put_u32(&mut bytes, 32, 1); // memory format
    put_u32(&mut bytes, 36, ROOT_CELL_OFFSET as u32);
    put_u32(&mut bytes, 40, BLOCK_SIZE as u32);
    put_u32(&mut bytes, 44, 1); // clustering factor

    let mut checksum = bytes[..508]
        .chunks(4)
        .fold(0u32, |acc, dword| acc ^ u32::from_le_bytes([dword[0], dword[1], dword[2], dword[3]]));
    if checksum == 0 {
        checksum = 1;
    } else if checksum == u32::MAX {
        checksum -= 1;
    }
    put_u32(&mut bytes, 508, checksum);

    // Hive bin header
    let data = BLOCK_SIZE;
    bytes[data..data + 4].copy_from_slice(b"hbin");
    put_u32(&mut bytes, data + 8, BLOCK_SIZE as u32);

    // Root key node cell
    let name = root_name.as_bytes();
    let cell_size = (4 + KEY_NODE_HEADER_SIZE + name.len() + 7) & !7;
    let cell = data + ROOT_CELL_OFFSET;
    bytes[cell..cell + 4].copy_from_slice(&(-(cell_size as i32)).to_le_bytes());

    let nk = cell + 4;
    bytes[nk..nk + 2].copy_from_slice(b"nk");
    bytes[nk + 2..nk + 4].copy_from_slice(&0x002Cu16.to_le_bytes()); // root entry, ASCII name
    put_u32(&mut bytes, nk + 28, u32::MAX); // subkeys list
    put_u32(&mut bytes, nk + 32, u32::MAX); // volatile subkeys list
    put_u32(&mut bytes, nk + 40, u32::MAX); // values list
    put_u32(&mut bytes, nk + 44, u32::MAX); // security
    put_u32(&mut bytes, nk + 48, u32::MAX); // class name
    bytes[nk + 72..nk + 74].copy_from_slice(&(name.len() as u16).to_le_bytes());
    bytes[nk + KEY_NODE_HEADER_SIZE..nk + KEY_NODE_HEADER_SIZE + name.len()].copy_from_slice(name);

    bytes
}

/// Writes a minimal hive to `path`, creating parent directories.
pub fn write_hive(path: &Path, root_name: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, minimal_hive_bytes(root_name))?;
    Ok(())
}

/// Creates a directory tree shaped like a mounted system drive:
///
/// ```text
/// Windows/System32/config/{SYSTEM,SOFTWARE,SAM}
/// Users/<user>/NTUSER.DAT
/// Users/<user>/AppData/Local/Microsoft/Windows/UsrClass.dat
/// ```
pub fn create_image_root(users: &[&str]) -> Result<TempDir> {
    let temp_dir = create_temp_dir()?;
    let base_path = temp_dir.path();

    let config = base_path.join("Windows/System32/config");
    for hive in ["SYSTEM", "SOFTWARE", "SAM"] {
        write_hive(&config.join(hive), &format!("CMI-CreateHive-{}", hive))?;
    }

    for user in users {
        let profile = base_path.join("Users").join(user);
        write_hive(&profile.join("NTUSER.DAT"), "ROOT")?;
        write_hive(
            &profile.join("AppData/Local/Microsoft/Windows/UsrClass.dat"),
            &format!("{}_Classes", user),
        )?;
    }
    fs::create_dir_all(base_path.join("Users"))?;

    Ok(temp_dir)
}

fn put_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
