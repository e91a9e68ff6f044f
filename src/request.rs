//! Launch request resolution.
//!
//! The shell integration launches the converter in one of two ways:
//!
//! - `code2xml "<file>"` from a file's context menu
//! - `code2xml "<dir>" -i` from a directory background's context menu
//!
//! [`LaunchRequest::resolve`] validates the path, classifies it as a single
//! file or directory request, and decides where the document is written.

use crate::error::{ConvertError, ErrorExt, Result};
use crate::render::OutputFormat;
use path_absolutize::Absolutize;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Document title used when the target path has no final component
pub const FALLBACK_TITLE: &str = "project";

/// What the target path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// A single file
    File,
    /// A directory tree
    Directory,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::File => f.write_str("file"),
            RequestKind::Directory => f.write_str("directory"),
        }
    }
}

/// A validated conversion request
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    source: PathBuf,
    kind: RequestKind,
    save_inside: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
}

impl LaunchRequest {
    /// Validate `path` and build a request.
    ///
    /// Fails with [`ConvertError::PathNotFound`] when the path does not exist
    /// and [`ConvertError::PermissionDenied`] when it cannot be read.
    pub fn resolve(
        path: &Path,
        save_inside: bool,
        format: OutputFormat,
        output: Option<&Path>,
    ) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(ConvertError::Usage {
                reason: "path argument is empty".to_string(),
            });
        }

        let source = path
            .canonicalize()
            .map_err(|e| ConvertError::from_target_io(path, e))?;
        let metadata =
            std::fs::metadata(&source).map_err(|e| ConvertError::from_target_io(path, e))?;

        let kind = if metadata.is_dir() {
            std::fs::read_dir(&source).map_err(|e| ConvertError::from_target_io(path, e))?;
            RequestKind::Directory
        } else if metadata.is_file() {
            std::fs::File::open(&source).map_err(|e| ConvertError::from_target_io(path, e))?;
            RequestKind::File
        } else {
            return Err(ConvertError::Unsupported {
                path: path.to_path_buf(),
                reason: "not a regular file or directory".to_string(),
            });
        };

        if save_inside && kind == RequestKind::File {
            log::debug!("-i has no effect for file targets");
        }

        let output = match output {
            Some(out) => Some(
                out.absolutize()
                    .fs_context("resolving output path", out)?
                    .into_owned(),
            ),
            None => None,
        };

        log::debug!("Resolved {} request for {}", kind, source.display());

        Ok(Self {
            source,
            kind,
            save_inside,
            format,
            output,
        })
    }

    /// Canonical target path
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Single file or directory
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Document format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Final component of the target, used to name and title the document
    pub fn title(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string())
    }

    /// Where the document is written.
    ///
    /// `<title>.<ext>` inside the target directory when `-i` was given,
    /// otherwise next to the target. An explicit `--output` wins.
    pub fn output_path(&self) -> PathBuf {
        if let Some(out) = &self.output {
            return out.clone();
        }

        let file_name = format!("{}.{}", self.title(), self.format.extension());
        let dir = match (self.kind, self.save_inside) {
            (RequestKind::Directory, true) => self.source.as_path(),
            _ => self.source.parent().unwrap_or(&self.source),
        };
        dir.join(file_name)
    }
}
