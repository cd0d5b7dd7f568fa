//! File-backed key-value store.
//!
//! Each key maps to one file inside a capability-scoped directory. Short keys
//! are stored under the hex encoding of the key plus a `.kv` suffix. Keys
//! whose hex form would not fit a portable file name are stored under their
//! SHA-256 digest with a `.kvh` suffix, and the file starts with the
//! hex-encoded key on its own line so a lookup never returns another key's
//! value. Writes go through [`super::atomic_write::write_atomic`]; a missing
//! file reads as an absent key.

use std::io;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::atomic_write::{is_temp_name, write_atomic};
use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

const DIRECT_SUFFIX: &str = ".kv";
const HASHED_SUFFIX: &str = ".kvh";

/// Longest hex-encoded key used verbatim as a file name.
///
/// Temporary names add a leading dot and a `.tmp.{pid}.{counter}` tail, and
/// the result must stay within the 255-byte name limit of common filesystems.
const MAX_DIRECT_HEX_LEN: usize = 160;

/// Temporary files younger than this may belong to a live writer in another
/// process and are left alone on open.
const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// Where a key lives on disk.
#[derive(Debug, PartialEq, Eq)]
enum Slot {
    Direct { file_name: String },
    Hashed { file_name: String, header: String },
}

impl Slot {
    fn for_key(key: &str) -> Self {
        let encoded = hex::encode(key);
        if encoded.len() <= MAX_DIRECT_HEX_LEN {
            return Self::Direct {
                file_name: format!("{encoded}{DIRECT_SUFFIX}"),
            };
        }
        let digest = Sha256::digest(key.as_bytes());
        Self::Hashed {
            file_name: format!("{}{HASHED_SUFFIX}", hex::encode(digest)),
            header: encoded,
        }
    }

    fn file_name(&self) -> &str {
        match self {
            Self::Direct { file_name } | Self::Hashed { file_name, .. } => file_name,
        }
    }

    fn encode(&self, value: &str) -> String {
        match self {
            Self::Direct { .. } => value.to_owned(),
            Self::Hashed { header, .. } => format!("{header}\n{value}"),
        }
    }

    fn decode(&self, key: &str, contents: String) -> Result<String, KeyValueStoreError> {
        match self {
            Self::Direct { .. } => Ok(contents),
            Self::Hashed { header, .. } => match contents.split_once('\n') {
                Some((stored, value)) if stored == header => Ok(value.to_owned()),
                _ => Err(KeyValueStoreError::read(
                    key,
                    "hashed entry does not belong to this key",
                )),
            },
        }
    }
}

/// Durable [`KeyValueStore`] rooted at a directory.
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl FileKeyValueStore {
    /// Open (creating if needed) the store directory at `root`.
    ///
    /// Temporary files old enough to have been left by an interrupted write
    /// are removed. Recent ones are kept, since another process sharing the
    /// directory may be about to rename them into place.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError::Unavailable`] when the directory cannot
    /// be created or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, KeyValueStoreError> {
        let unavailable =
            |err: io::Error| KeyValueStoreError::unavailable(format!("{root}: {err}"));
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(unavailable)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(unavailable)?;
        let store = Self {
            root: root.to_path_buf(),
            dir,
        };
        store.remove_stale_temp_files(SystemTime::now());
        Ok(store)
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn remove_stale_temp_files(&self, now: SystemTime) {
        let Ok(entries) = self.dir.entries() else {
            return;
        };
        for entry in entries.filter_map(Result::ok) {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_temp_name(&name) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .map(cap_std::time::SystemTime::into_std);
            if !modified.is_ok_and(|modified| is_stale(modified, now)) {
                continue;
            }
            if self.dir.remove_file(&name).is_ok() {
                debug!(file = %name, "removed stale temporary file");
            }
        }
    }
}

fn is_stale(modified: SystemTime, now: SystemTime) -> bool {
    now.duration_since(modified)
        .is_ok_and(|age| age >= STALE_TEMP_AGE)
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        let slot = Slot::for_key(key);
        match self.dir.read_to_string(slot.file_name()) {
            Ok(contents) => slot.decode(key, contents).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(KeyValueStoreError::read(key, err.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        let slot = Slot::for_key(key);
        write_atomic(&self.dir, slot.file_name(), &slot.encode(value))
            .map_err(|err| KeyValueStoreError::write(key, err.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        match self.dir.remove_file(Slot::for_key(key).file_name()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(KeyValueStoreError::write(key, err.to_string())),
        }
    }
}
