//! Ignore rules deciding which files end up in the document.
//!
//! Directories are pruned by name before the walk descends into them; files
//! are screened by name and extension first, then by size, content sniffing
//! and blankness once they have been read.

use crate::render::OutputFormat;
use serde::Serialize;
use std::fmt;
use std::io::Read;
use std::path::Path;
use walkdir::DirEntry;

/// Default per-file size limit (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Number of leading bytes inspected when deciding whether a file is binary
pub const SNIFF_LEN: usize = 1024;

/// Hidden directories that are still walked
const HIDDEN_DIR_ALLOWLIST: &[&str] = &[".github"];

/// VCS metadata, IDE state, dependency caches and build output
const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".idea",
    ".vscode",
    ".vs",
    "__pycache__",
    "node_modules",
    "venv",
    ".venv",
    "env",
    "dist",
    "build",
    "target",
    "out",
    "bin",
    "obj",
    "debug",
    "release",
    ".gradle",
    "captures",
    "gradle",
    ".DS_Store",
    "coverage",
    ".next",
    ".nuxt",
];

/// Wrapper scripts, machine-local settings and lockfiles (compared lowercase)
const IGNORED_FILE_NAMES: &[&str] = &[
    "gradlew",
    "gradlew.bat",
    "mvnw",
    "mvnw.cmd",
    "local.properties",
    "thumbs.db",
    "desktop.ini",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.lock",
    "poetry.lock",
];

/// Extensions without the leading dot (compared lowercase)
const IGNORED_EXTENSIONS: &[&str] = &[
    // media
    "png",
    "jpg",
    "jpeg",
    "gif",
    "bmp",
    "ico",
    "svg",
    "webp",
    "tiff",
    "mp3",
    "mp4",
    "wav",
    "avi",
    "mov",
    // binaries and archives
    "exe",
    "dll",
    "so",
    "dylib",
    "bin",
    "apk",
    "aab",
    "jar",
    "war",
    "zip",
    "tar",
    "gz",
    "7z",
    "rar",
    "iso",
    "cab",
    // build products and local databases
    "pyc",
    "class",
    "o",
    "obj",
    "pdb",
    "suo",
    "db",
    "sqlite",
    "sqlite3",
    "lock",
    "log",
    // previously generated documents
    "md",
];

/// Why a file was left out of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// File name is on the ignore list
    IgnoredName,
    /// Extension is on the ignore list
    IgnoredExtension,
    /// Larger than the configured size limit
    TooLarge,
    /// NUL byte found in the leading bytes
    Binary,
    /// Only whitespace
    Empty,
    /// The document being written
    OutputFile,
    /// Could not be opened or read
    Unreadable,
    /// FIFO, socket, device or other special file
    NotRegular,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::IgnoredName => "ignored file name",
            SkipReason::IgnoredExtension => "ignored extension",
            SkipReason::TooLarge => "exceeds size limit",
            SkipReason::Binary => "binary content",
            SkipReason::Empty => "blank file",
            SkipReason::OutputFile => "output document",
            SkipReason::Unreadable => "unreadable",
            SkipReason::NotRegular => "not a regular file",
        };
        f.write_str(text)
    }
}

/// Tunable parts of the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Files above this many bytes are skipped
    pub max_file_size: u64,
    /// Walk into dot-directories that are not on the ignore list
    pub include_hidden: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            include_hidden: false,
        }
    }
}

/// File filter bound to one output format
#[derive(Debug, Clone)]
pub struct FileFilter {
    config: FilterConfig,
    format: OutputFormat,
}

impl FileFilter {
    /// Create a filter for documents of `format`
    pub fn new(config: FilterConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }

    /// Whether the walk should skip this entry (and, for directories, everything below it).
    ///
    /// The walk root is never pruned.
    pub fn prune(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.is_pruned_dir(&name)
    }

    /// Directory name check
    pub fn is_pruned_dir(&self, name: &str) -> bool {
        if IGNORED_DIRS.contains(&name) {
            return true;
        }
        !self.config.include_hidden
            && name.starts_with('.')
            && name.len() > 1
            && !HIDDEN_DIR_ALLOWLIST.contains(&name)
    }

    /// Name and extension check, done before the file is opened
    pub fn screen_name(&self, path: &Path) -> Option<SkipReason> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if IGNORED_FILE_NAMES.contains(&file_name.as_str()) {
            return Some(SkipReason::IgnoredName);
        }

        let ext = extension_of(path);
        if IGNORED_EXTENSIONS.contains(&ext.as_str()) || ext == self.format.extension() {
            return Some(SkipReason::IgnoredExtension);
        }
        None
    }

    /// Read a file and check its size and content.
    ///
    /// Returns the decoded text (lossy UTF-8) or the reason it was rejected.
    pub fn load(&self, path: &Path, len: u64) -> std::result::Result<String, SkipReason> {
        if len > self.config.max_file_size {
            return Err(SkipReason::TooLarge);
        }

        // One byte past the limit is enough to tell an oversized file apart
        let limit = self.config.max_file_size.saturating_add(1);
        let mut bytes = Vec::with_capacity(len as usize);
        std::fs::File::open(path)
            .and_then(|file| file.take(limit).read_to_end(&mut bytes))
            .map_err(|e| {
                log::debug!("Failed to read {}: {}", path.display(), e);
                SkipReason::Unreadable
            })?;

        // The file may have grown since its metadata was read
        if bytes.len() as u64 > self.config.max_file_size {
            return Err(SkipReason::TooLarge);
        }
        if is_binary(&bytes) {
            return Err(SkipReason::Binary);
        }

        let content = String::from_utf8_lossy(&bytes).into_owned();
        if content.trim().is_empty() {
            return Err(SkipReason::Empty);
        }
        Ok(content)
    }
}

/// Lowercase extension without the dot, empty if there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// A file is binary when its leading bytes contain a NUL
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(SNIFF_LEN)].contains(&0)
}
