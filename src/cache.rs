//! On-disk snapshot of the path index.
//!
//! Little-endian binary layout: magic, format version, the root path the
//! snapshot was built for, a unix timestamp, then length-prefixed entries.
//! Every integrity failure is a typed error that callers treat as a cache
//! miss; a corrupt cache never takes searching down, it only costs a rescan.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::debug;

use crate::app_dirs;
use crate::index::PathIndex;

const CACHE_MAGIC: u32 = 0x534E_4946;
const CACHE_VERSION: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("not an index cache (bad magic)")]
    BadMagic,

    #[error("unsupported cache version {0}")]
    UnsupportedVersion(u16),

    #[error("cache was built for a different root")]
    RootMismatch,

    #[error("cache file is truncated")]
    Truncated,

    #[error("cache entry is not valid UTF-8")]
    InvalidEntry,
}

/// Handle on the snapshot file for one scan root.
pub struct IndexCache {
    path: PathBuf,
    root: String,
}

impl IndexCache {
    /// Resolve the snapshot location for `root` inside the platform cache
    /// directory. The file name is the Wyhash (seed 0) of the absolute root.
    pub fn for_root(root: &Path) -> Option<Self> {
        let dir = app_dirs::cache_dir().ok()?;
        Some(Self::at(&dir, root))
    }

    /// Place the snapshot under an explicit directory.
    pub fn at(dir: &Path, root: &Path) -> Self {
        let root = root.to_string_lossy().into_owned();
        let hash = wyhash::wyhash(root.as_bytes(), 0);
        Self {
            path: dir.join(format!("{hash:016x}.idx")),
            root,
        }
    }

    /// Load the snapshot into `index`, replacing its contents, and return
    /// the stored timestamp (unix seconds).
    pub fn load(&self, index: &mut PathIndex) -> Result<i64, CacheError> {
        let bytes = fs::read(&self.path)?;
        let mut reader = Reader { buf: &bytes };

        if reader.u32()? != CACHE_MAGIC {
            return Err(CacheError::BadMagic);
        }
        let version = reader.u16()?;
        if version != CACHE_VERSION {
            return Err(CacheError::UnsupportedVersion(version));
        }
        let root_len = reader.u16()? as usize;
        if reader.take(root_len)? != self.root.as_bytes() {
            return Err(CacheError::RootMismatch);
        }
        let timestamp = reader.i64()?;
        let count = reader.u32()?;

        index.clear();
        for _ in 0..count {
            let len = reader.u16()? as usize;
            let path = std::str::from_utf8(reader.take(len)?)
                .map_err(|_| CacheError::InvalidEntry)?;
            index.add(path);
        }

        debug!(
            "loaded {} cached entries from {}",
            index.count(),
            self.path.display()
        );
        Ok(timestamp)
    }

    /// Write a snapshot of `index` atomically (temp file plus rename).
    pub fn save(&self, index: &PathIndex) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create cache directory: {}", dir.display()))?;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let mut data = Vec::with_capacity(64 + index.count() * 32);
        data.extend_from_slice(&CACHE_MAGIC.to_le_bytes());
        data.extend_from_slice(&CACHE_VERSION.to_le_bytes());
        let root = self.root.as_bytes();
        let root_len =
            u16::try_from(root.len()).context("root path too long for the cache header")?;
        data.extend_from_slice(&root_len.to_le_bytes());
        data.extend_from_slice(root);
        data.extend_from_slice(&timestamp.to_le_bytes());

        let entries: Vec<&str> = index
            .iter_entries()
            .map(|entry| entry.path)
            .filter(|path| {
                let fits = path.len() <= u16::MAX as usize;
                if !fits {
                    debug!("skipping over-long path in cache snapshot: {path}");
                }
                fits
            })
            .collect();
        let count = u32::try_from(entries.len()).context("too many entries for the cache")?;
        data.extend_from_slice(&count.to_le_bytes());
        for path in entries {
            data.extend_from_slice(&(path.len() as u16).to_le_bytes());
            data.extend_from_slice(path.as_bytes());
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| format!("failed to create cache file: {}", tmp_path.display()))?;
            file.write_all(&data)
                .with_context(|| format!("failed to write cache file: {}", tmp_path.display()))?;
            file.sync_all().ok();
        }

        let _ = fs::remove_file(&self.path);
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to move cache file from {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Bounds-checked little-endian cursor over the snapshot bytes.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CacheError> {
        if self.buf.len() < n {
            return Err(CacheError::Truncated);
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }

    fn u16(&mut self) -> Result<u16, CacheError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, CacheError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i64(&mut self) -> Result<i64, CacheError> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> PathIndex {
        let mut index = PathIndex::new();
        index.add("src/main.zig");
        index.add("src/scorer.zig");
        index.add("docs/README.md");
        index
    }

    fn paths_of(index: &PathIndex) -> Vec<String> {
        index.iter_entries().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn round_trip_preserves_entries_in_order() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));

        let original = sample_index();
        cache.save(&original).expect("save");

        let mut restored = PathIndex::new();
        let timestamp = cache.load(&mut restored).expect("load");
        assert!(timestamp > 0);
        assert_eq!(restored.count(), original.count());
        assert_eq!(paths_of(&restored), paths_of(&original));
    }

    #[test]
    fn file_name_is_the_wyhash_of_the_root() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));
        let expected = format!("{:016x}.idx", wyhash::wyhash(b"/project", 0));
        assert_eq!(cache.path().file_name().unwrap().to_str().unwrap(), expected);
    }

    #[test]
    fn missing_file_is_an_io_miss() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));
        let mut index = PathIndex::new();
        assert!(matches!(cache.load(&mut index), Err(CacheError::Io(_))));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));
        cache.save(&sample_index()).expect("save");

        let mut bytes = fs::read(cache.path()).expect("read");
        bytes[0] ^= 0xff;
        fs::write(cache.path(), &bytes).expect("rewrite");

        let mut index = PathIndex::new();
        assert!(matches!(cache.load(&mut index), Err(CacheError::BadMagic)));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));
        cache.save(&sample_index()).expect("save");

        let mut bytes = fs::read(cache.path()).expect("read");
        bytes[4] = 0xee;
        fs::write(cache.path(), &bytes).expect("rewrite");

        let mut index = PathIndex::new();
        assert!(matches!(
            cache.load(&mut index),
            Err(CacheError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn root_mismatch_is_rejected() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));
        cache.save(&sample_index()).expect("save");

        // same file, different root handle
        let other = IndexCache {
            path: cache.path().to_path_buf(),
            root: "/elsewhere".to_string(),
        };
        let mut index = PathIndex::new();
        assert!(matches!(
            other.load(&mut index),
            Err(CacheError::RootMismatch)
        ));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let cache = IndexCache::at(temp.path(), Path::new("/project"));
        cache.save(&sample_index()).expect("save");

        let bytes = fs::read(cache.path()).expect("read");
        fs::write(cache.path(), &bytes[..bytes.len() - 3]).expect("rewrite");

        let mut index = PathIndex::new();
        assert!(matches!(cache.load(&mut index), Err(CacheError::Truncated)));
    }
}
