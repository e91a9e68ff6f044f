//! Source file collection.
//!
//! Walks a directory depth-first with siblings in file-name order, prunes
//! ignored directories, and hands every candidate file to a visitor as either
//! a loaded [`SourceFile`] or a [`SkipReason`].

use crate::error::{ConvertError, Result};
use crate::filter::{FileFilter, SkipReason, extension_of};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A text file ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the conversion root, `/`-separated
    pub relative_path: String,
    /// Lowercase extension without the dot, empty if none
    pub extension: String,
    /// File content, lossily decoded as UTF-8
    pub content: String,
}

/// Outcome for one file seen during the walk
#[derive(Debug)]
pub enum Visit {
    /// File passed every rule
    Included(SourceFile),
    /// File was left out
    Skipped {
        /// Path of the skipped file
        path: PathBuf,
        /// Rule that rejected it
        reason: SkipReason,
    },
}

/// Walks directories and loads files through a [`FileFilter`]
#[derive(Debug)]
pub struct Collector<'a> {
    filter: &'a FileFilter,
    exclude: Option<PathBuf>,
}

impl<'a> Collector<'a> {
    /// Create a collector using `filter`
    pub fn new(filter: &'a FileFilter) -> Self {
        Self {
            filter,
            exclude: None,
        }
    }

    /// Never include the file at `path` (the document being written)
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }

    /// Walk `root` and pass every file to `visit`.
    ///
    /// Errors on individual entries are logged and skipped; an error on the
    /// root itself aborts the walk.
    pub fn walk_dir<F>(&self, root: &Path, mut visit: F) -> Result<()>
    where
        F: FnMut(Visit) -> Result<()>,
    {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.filter.prune(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(match e.into_io_error() {
                        Some(io) => ConvertError::from_target_io(root, io),
                        None => ConvertError::Unsupported {
                            path: root.to_path_buf(),
                            reason: "filesystem loop at walk root".to_string(),
                        },
                    });
                }
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            // Follows symlinks; a link to a directory is not descended into
            let metadata = match std::fs::metadata(path) {
                Ok(m) if m.is_dir() => continue,
                Ok(m) => m,
                Err(e) => {
                    log::debug!("Cannot stat {}: {}", path.display(), e);
                    visit(skipped(path, SkipReason::Unreadable))?;
                    continue;
                }
            };

            // Reading a FIFO or device would block or never end
            if !metadata.is_file() {
                visit(skipped(path, SkipReason::NotRegular))?;
                continue;
            }

            if self.is_excluded(path) {
                visit(skipped(path, SkipReason::OutputFile))?;
                continue;
            }

            if let Some(reason) = self.filter.screen_name(path) {
                visit(skipped(path, reason))?;
                continue;
            }

            let outcome = match self.filter.load(path, metadata.len()) {
                Ok(content) => Visit::Included(SourceFile {
                    relative_path: relative_path(root, path),
                    extension: extension_of(path),
                    content,
                }),
                Err(reason) => skipped(path, reason),
            };
            visit(outcome)?;
        }

        Ok(())
    }

    /// Load a single explicitly chosen file.
    ///
    /// Name and extension rules do not apply; size, binary and blank checks do.
    pub fn load_file(&self, path: &Path) -> Result<SourceFile> {
        let metadata =
            std::fs::metadata(path).map_err(|e| ConvertError::from_target_io(path, e))?;

        let content = self
            .filter
            .load(path, metadata.len())
            .map_err(|reason| ConvertError::Unsupported {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            })?;

        Ok(SourceFile {
            relative_path: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            extension: extension_of(path),
            content,
        })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(exclude) = &self.exclude else {
            return false;
        };
        if path == exclude {
            return true;
        }
        match (path.canonicalize(), exclude.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

fn skipped(path: &Path, reason: SkipReason) -> Visit {
    Visit::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

/// `/`-separated path of `path` below `root`
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use crate::render::OutputFormat;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn collect(root: &Path, filter: &FileFilter) -> (Vec<String>, Vec<(String, SkipReason)>) {
        let mut included = Vec::new();
        let mut skipped = Vec::new();
        Collector::new(filter)
            .walk_dir(root, |visit| {
                match visit {
                    Visit::Included(file) => included.push(file.relative_path),
                    Visit::Skipped { path, reason } => {
                        skipped.push((relative_path(root, &path), reason))
                    }
                }
                Ok(())
            })
            .unwrap();
        (included, skipped)
    }

    #[test]
    fn test_walk_is_sorted_and_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/b.rs", b"b");
        write(root, "src/a.rs", b"a");
        write(root, "Cargo.toml", b"[package]");
        write(root, "target/debug/out.rs", b"generated");
        write(root, "node_modules/x/index.js", b"x");
        write(root, ".github/workflows/ci.yml", b"on: push");
        write(root, ".cache/data.txt", b"cached");

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let (included, _) = collect(root, &filter);
        assert_eq!(
            included,
            vec![
                ".github/workflows/ci.yml",
                "Cargo.toml",
                "src/a.rs",
                "src/b.rs"
            ]
        );
    }

    #[test]
    fn test_skip_reasons_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "logo.png", b"png");
        write(root, "yarn.lock", b"lock");
        write(root, "blob.dat", b"\0\x01\x02");
        write(root, "empty.txt", b"   ");
        write(root, "ok.txt", b"ok");

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let (included, skipped) = collect(root, &filter);
        assert_eq!(included, vec!["ok.txt"]);
        assert!(skipped.contains(&("logo.png".to_string(), SkipReason::IgnoredExtension)));
        assert!(skipped.contains(&("yarn.lock".to_string(), SkipReason::IgnoredName)));
        assert!(skipped.contains(&("blob.dat".to_string(), SkipReason::Binary)));
        assert!(skipped.contains(&("empty.txt".to_string(), SkipReason::Empty)));
    }

    #[test]
    fn test_excluded_output_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "notes.txt", b"keep");
        write(root, "out.txt", b"previous output");

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let mut included = Vec::new();
        Collector::new(&filter)
            .exclude(root.join("out.txt"))
            .walk_dir(root, |visit| {
                if let Visit::Included(file) = visit {
                    included.push(file.relative_path);
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(included, vec!["notes.txt"]);
    }

    #[test]
    fn test_root_named_like_ignored_dir_is_walked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("build");
        write(&root, "script.sh", b"echo hi");

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let (included, _) = collect(&root, &filter);
        assert_eq!(included, vec!["script.sh"]);
    }

    #[test]
    fn test_load_file_bypasses_name_rules() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "NOTES.md", b"# notes");

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let file = Collector::new(&filter)
            .load_file(&dir.path().join("NOTES.md"))
            .unwrap();
        assert_eq!(file.relative_path, "NOTES.md");
        assert_eq!(file.extension, "md");
    }

    #[test]
    fn test_load_file_rejects_binary() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tool", b"\x7fELF\0\0");

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let err = Collector::new(&filter)
            .load_file(&dir.path().join("tool"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Unsupported { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_skipped_without_reading() {
        use nix::sys::stat::Mode;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.txt", b"alpha");
        nix::unistd::mkfifo(&root.join("pipe"), Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let (included, skipped) = collect(root, &filter);
        assert_eq!(included, vec!["a.txt"]);
        assert_eq!(skipped, vec![("pipe".to_string(), SkipReason::NotRegular)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "good.rs", b"fn good() {}");
        std::os::unix::fs::symlink(root.join("missing-target"), root.join("dangling")).unwrap();

        let filter = FileFilter::new(FilterConfig::default(), OutputFormat::Markdown);
        let (included, skipped) = collect(root, &filter);
        assert_eq!(included, vec!["good.rs"]);
        assert_eq!(
            skipped,
            vec![("dangling".to_string(), SkipReason::Unreadable)]
        );
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("root");
        assert_eq!(relative_path(root, &root.join("a").join("b.rs")), "a/b.rs");
    }
}
