//! Request path resolution
//!
//! Maps a request URI path onto a regular file below the configured root, or
//! reports why the request is not ours to serve. "Not handled" is a routing
//! signal, never an error.

use std::borrow::Cow;
use std::fmt;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::config::StaticFilesConfig;

/// Why a request path was not resolved to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledReason {
    /// Percent-decoding failed or produced a NUL byte
    InvalidEncoding,
    /// The path is absolute or carries a drive/root prefix
    Rooted,
    /// A `..` segment is present
    Traversal,
    /// The candidate does not stay below the root
    OutsideRoot,
    /// The extension is on the ignore list
    IgnoredExtension,
    /// No regular file exists at the candidate
    NotFound,
}

impl fmt::Display for UnhandledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidEncoding => "invalid encoding",
            Self::Rooted => "rooted path",
            Self::Traversal => "parent directory segment",
            Self::OutsideRoot => "outside root",
            Self::IgnoredExtension => "ignored extension",
            Self::NotFound => "no such file",
        };
        f.write_str(text)
    }
}

/// A request path that maps onto an existing regular file
#[derive(Debug)]
pub struct ResolvedPath {
    /// Absolute, symlink-free path below the root
    pub path: PathBuf,
    pub metadata: Metadata,
}

#[derive(Debug)]
pub enum Resolution {
    Resolved(ResolvedPath),
    Unhandled(UnhandledReason),
}

/// Resolve `request_path` against `config.root`
///
/// `config.root` is expected to be absolute and canonical, which
/// `StaticFiles::new` guarantees.
pub async fn resolve(request_path: &str, config: &StaticFilesConfig) -> Resolution {
    let candidate = match candidate_path(request_path, config) {
        Ok(candidate) => candidate,
        Err(reason) => return Resolution::Unhandled(reason),
    };

    // Symlinks may still point elsewhere; compare the real location too
    let Ok(real_path) = tokio::fs::canonicalize(&candidate).await else {
        return Resolution::Unhandled(UnhandledReason::NotFound);
    };
    if !real_path.starts_with(&config.root) {
        return Resolution::Unhandled(UnhandledReason::OutsideRoot);
    }

    match tokio::fs::metadata(&real_path).await {
        Ok(metadata) if metadata.is_file() => Resolution::Resolved(ResolvedPath {
            path: real_path,
            metadata,
        }),
        _ => Resolution::Unhandled(UnhandledReason::NotFound),
    }
}

/// Lexical part of resolution; touches no filesystem state
pub fn candidate_path(
    request_path: &str,
    config: &StaticFilesConfig,
) -> Result<PathBuf, UnhandledReason> {
    let decoded = decode(request_path)?;

    let relative = decoded.strip_prefix('/').unwrap_or(&decoded);
    let relative = if relative.is_empty() {
        config.index_file.as_str()
    } else {
        relative
    };

    let relative = Path::new(relative);
    if relative.has_root() || relative.is_absolute() {
        return Err(UnhandledReason::Rooted);
    }
    for component in relative.components() {
        match component {
            Component::ParentDir => return Err(UnhandledReason::Traversal),
            Component::RootDir | Component::Prefix(_) => return Err(UnhandledReason::Rooted),
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    let candidate = config.root.join(relative);
    if !candidate.starts_with(&config.root) {
        return Err(UnhandledReason::OutsideRoot);
    }

    if let Some(extension) = candidate.extension().and_then(|e| e.to_str()) {
        if config.is_ignored(&format!(".{extension}")) {
            return Err(UnhandledReason::IgnoredExtension);
        }
    }

    Ok(candidate)
}

fn decode(request_path: &str) -> Result<Cow<'_, str>, UnhandledReason> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| UnhandledReason::InvalidEncoding)?;
    if decoded.contains('\0') {
        return Err(UnhandledReason::InvalidEncoding);
    }
    Ok(decoded)
}
