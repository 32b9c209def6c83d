use super::{KvBackend, StoreError, StoreResult};
use crate::capacity::entry_bytes;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// Filesystem key-value backend: one file per key under `root`.
///
/// Key names are percent-encoded into file names, so any string is a valid key.
/// Dot-files in `root` are never treated as keys (temp files live there).
pub struct FsBackend {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            quota_bytes: None,
        }
    }

    /// Enforce a capacity ceiling, measured the same way the capacity monitor measures.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    fn key_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::Unknown("empty storage key".to_string()));
        }
        Ok(self.root.join(encode_key(key)))
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(classify_io)?;
        }
        Ok(())
    }

    fn check_quota(&self, key: &str, value: &str) -> StoreResult<()> {
        let Some(quota) = self.quota_bytes else {
            return Ok(());
        };
        let others: u64 = self
            .entries()?
            .iter()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| entry_bytes(k, v))
            .sum();
        if others + entry_bytes(key, value) > quota {
            return Err(StoreError::QuotaExceeded);
        }
        Ok(())
    }
}

impl KvBackend for FsBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(classify_io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let target = self.key_path(key)?;
        self.ensure_dir()?;
        self.check_quota(key, value)?;

        // Atomic write
        let tmp = self.root.join(format!(".kv-{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(classify_io(e));
        }
        fs::rename(&tmp, target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            classify_io(e)
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(classify_io(e)),
        }
    }

    fn entries(&self) -> StoreResult<Vec<(String, String)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(classify_io)? {
            let path = entry.map_err(classify_io)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(key) = decode_key(name) {
                match fs::read_to_string(&path) {
                    Ok(value) => entries.push((key, value)),
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                        warn!(path = %path.display(), "skipping entry that is not UTF-8");
                    }
                    Err(e) => return Err(classify_io(e)),
                }
            }
        }
        entries.sort();
        Ok(entries)
    }
}

/// Map an I/O failure onto the storage failure classes.
fn classify_io(err: io::Error) -> StoreError {
    match err.kind() {
        io::ErrorKind::StorageFull => StoreError::QuotaExceeded,
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Unknown(err.to_string()),
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_encoding_roundtrip() {
        for key in ["inventory", "my shop/back room", "ünïcode", "a.b", "%"] {
            let encoded = encode_key(key);
            assert!(!encoded.starts_with('.'));
            assert!(!encoded.contains('/'));
            assert_eq!(decode_key(&encoded).as_deref(), Some(key));
        }
    }

    #[test]
    fn decode_rejects_truncated_escape() {
        assert_eq!(decode_key("abc%4"), None);
        assert_eq!(decode_key("abc%ZZ"), None);
    }

    #[test]
    fn classify_maps_storage_full_to_quota() {
        let err = io::Error::from(io::ErrorKind::StorageFull);
        assert_eq!(classify_io(err), StoreError::QuotaExceeded);
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(classify_io(err), StoreError::Unavailable(_)));
        let err = io::Error::other("boom");
        assert!(matches!(classify_io(err), StoreError::Unknown(_)));
    }
}
