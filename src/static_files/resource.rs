//! Servable file metadata
//!
//! A [`Resource`] is built fresh for every request from filesystem metadata.

use std::collections::hash_map::DefaultHasher;
use std::fs::Metadata;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, SubsecRound, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: PathBuf,
    pub length: u64,
    /// Whole seconds; HTTP dates carry no sub-second part
    pub last_modified: DateTime<Utc>,
    /// Unquoted
    pub etag: String,
}

impl Resource {
    pub fn new(path: PathBuf, length: u64, modified: SystemTime) -> Self {
        let last_modified = DateTime::<Utc>::from(modified).trunc_subsecs(0);
        let etag = generate_etag(&last_modified, length);
        Self {
            path,
            length,
            last_modified,
            etag,
        }
    }

    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> io::Result<Self> {
        Ok(Self::new(path, metadata.len(), metadata.modified()?))
    }

    /// `ETag` header value
    pub fn quoted_etag(&self) -> String {
        format!("\"{}\"", self.etag)
    }
}

/// Generate an unquoted `ETag` from modification time and size
///
/// Any change to either input changes the tag; the same inputs give the same
/// tag for the lifetime of the binary.
pub fn generate_etag(last_modified: &DateTime<Utc>, length: u64) -> String {
    let mut hasher = DefaultHasher::new();
    last_modified.timestamp().hash(&mut hasher);
    length.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
