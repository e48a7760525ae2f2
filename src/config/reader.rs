//! Document Reader
//!
//! Enumerates one `*.d` directory (non-recursively), parses every `*.json`
//! file in it and validates the result against the directory's kinds.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rkt_config_schema::{Document, Record, RecordKind};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::LoadError;

/// A configuration subdirectory of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigDir {
    /// `auth.d`: `auth` and `dockerAuth` records
    Auth,
    /// `paths.d`: `paths` records
    Paths,
    /// `stage1.d`: `stage1` records
    Stage1,
}

impl ConfigDir {
    pub const ALL: [ConfigDir; 3] = [ConfigDir::Auth, ConfigDir::Paths, ConfigDir::Stage1];

    pub fn dir_name(&self) -> &'static str {
        match self {
            ConfigDir::Auth => "auth.d",
            ConfigDir::Paths => "paths.d",
            ConfigDir::Stage1 => "stage1.d",
        }
    }

    /// Whether a record of `kind` may live in this directory.
    pub fn accepts(&self, kind: RecordKind) -> bool {
        match self {
            ConfigDir::Auth => matches!(kind, RecordKind::Auth | RecordKind::DockerAuth),
            ConfigDir::Paths => kind == RecordKind::Paths,
            ConfigDir::Stage1 => kind == RecordKind::Stage1,
        }
    }
}

impl fmt::Display for ConfigDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A successfully parsed file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// SHA-256 of the raw file bytes, lowercase hex
    pub digest: String,
    pub record: Record,
}

/// Parse a single document without any directory placement check.
///
/// `path` is used only in diagnostics.
pub fn parse_document(path: &Path, bytes: &[u8]) -> Result<Record, LoadError> {
    decode(path, bytes, None)
}

/// Read every `*.json` file in `dir_path`, in file-name byte order.
///
/// A missing directory yields no files.
pub fn read_dir(dir_path: &Path, dir: ConfigDir) -> Result<Vec<ParsedFile>, LoadError> {
    let mut parsed = Vec::new();
    for path in list_json_files(dir_path)? {
        let bytes = fs::read(&path).map_err(|e| LoadError::io(&path, e))?;
        let record = decode(&path, &bytes, Some(dir))?;
        debug!(path = %path.display(), kind = %record.kind(), "parsed config document");
        parsed.push(ParsedFile {
            digest: sha256_hex(&bytes),
            path,
            record,
        });
    }
    Ok(parsed)
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn decode(path: &Path, bytes: &[u8], dir: Option<ConfigDir>) -> Result<Record, LoadError> {
    let document = Document::from_slice(bytes).map_err(|e| LoadError::from_schema(path, e))?;
    let kind = document
        .kind()
        .map_err(|e| LoadError::from_schema(path, e))?;

    if let Some(dir) = dir {
        if !dir.accepts(kind) {
            return Err(LoadError::MisplacedRecord {
                path: path.to_path_buf(),
                expected: dir,
                actual: kind,
            });
        }
    }

    document
        .into_record()
        .map_err(|e| LoadError::from_schema(path, e))
}

fn list_json_files(dir_path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    match fs::metadata(dir_path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir_path.display(), "config directory missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(LoadError::io(dir_path, e)),
        Ok(meta) if !meta.is_dir() => {
            return Err(LoadError::io(dir_path, io::Error::other("not a directory")));
        }
        Ok(_) => {}
    }

    let walker = WalkDir::new(dir_path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() > 0 && is_not_found(&err) => {
                warn!(path = ?err.path(), "skipping dangling config entry");
                continue;
            }
            Err(err) => return Err(walk_error(dir_path, err)),
        };

        // Names need not be UTF-8.
        if !entry.file_name().as_encoded_bytes().ends_with(b".json") {
            continue;
        }
        if !entry.file_type().is_file() {
            warn!(path = %entry.path().display(), "skipping non-file config entry");
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn walk_error(dir_path: &Path, err: walkdir::Error) -> LoadError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir_path.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    LoadError::LayerLoadError { path, source }
}
