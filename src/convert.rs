//! End-to-end conversion of one launch request into one document.

use crate::collect::{Collector, Visit};
use crate::error::{ConvertError, ErrorExt, Result};
use crate::filter::{FileFilter, FilterConfig, SkipReason};
use crate::render::OutputFormat;
use crate::request::{LaunchRequest, RequestKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Summary of a finished conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Canonical target path
    pub source: PathBuf,
    /// Document that was written
    pub output: PathBuf,
    /// Single file or directory
    pub kind: RequestKind,
    /// Document format
    pub format: OutputFormat,
    /// Number of files in the document
    pub files_written: usize,
    /// Size of the document in bytes
    pub bytes_written: u64,
    /// Skipped file counts per reason
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Every skipped file, in walk order
    #[serde(skip)]
    pub skipped_files: Vec<(PathBuf, SkipReason)>,
}

impl ConversionReport {
    fn new(request: &LaunchRequest, output: PathBuf) -> Self {
        Self {
            source: request.source().to_path_buf(),
            output,
            kind: request.kind(),
            format: request.format(),
            files_written: 0,
            bytes_written: 0,
            skipped: BTreeMap::new(),
            skipped_files: Vec::new(),
        }
    }

    fn record_skip(&mut self, path: PathBuf, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
        self.skipped_files.push((path, reason));
    }

    /// Total number of skipped files
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Output file that is deleted on drop unless the conversion finished
struct PartialOutput {
    path: PathBuf,
    committed: bool,
}

impl PartialOutput {
    fn create(path: &Path) -> Result<(Self, BufWriter<File>)> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .fs_context("creating output directory", parent)?;
        }
        let file = File::create(path).fs_context("creating output file", path)?;
        Ok((
            Self {
                path: path.to_path_buf(),
                committed: false,
            },
            BufWriter::new(file),
        ))
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.committed {
            log::debug!("Removing partial output {}", self.path.display());
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Runs conversions with one filter configuration
#[derive(Debug, Clone)]
pub struct Converter {
    filter: FileFilter,
}

impl Converter {
    /// Create a converter for documents of `format`
    pub fn new(config: FilterConfig, format: OutputFormat) -> Self {
        Self {
            filter: FileFilter::new(config, format),
        }
    }

    /// Convert `request` and write its document.
    ///
    /// Blocking; see [`convert_in_background`] for async callers.
    pub fn convert(&self, request: &LaunchRequest) -> Result<ConversionReport> {
        let output = request.output_path();
        if output.canonicalize().is_ok_and(|o| o == request.source()) {
            return Err(ConvertError::Usage {
                reason: format!("output path {} would overwrite the input", output.display()),
            });
        }

        let mut report = ConversionReport::new(request, output.clone());
        let renderer = request.format().renderer();
        let collector = Collector::new(&self.filter);

        // Load before creating the output so a rejected file leaves nothing behind
        let single = match request.kind() {
            RequestKind::File => Some(collector.load_file(request.source())?),
            RequestKind::Directory => None,
        };

        let (guard, mut writer) = PartialOutput::create(&output)?;
        renderer
            .begin(&mut writer, &request.title())
            .fs_context("writing", &output)?;

        match single {
            Some(file) => {
                renderer
                    .file(&mut writer, &file)
                    .fs_context("writing", &output)?;
                report.files_written = 1;
            }
            None => {
                let collector = collector.exclude(output.clone());
                collector.walk_dir(request.source(), |visit| {
                    match visit {
                        Visit::Included(file) => {
                            log::trace!("Adding {}", file.relative_path);
                            renderer
                                .file(&mut writer, &file)
                                .fs_context("writing", &output)?;
                            report.files_written += 1;
                        }
                        Visit::Skipped { path, reason } => {
                            log::debug!("Skipping {} ({})", path.display(), reason);
                            report.record_skip(path, reason);
                        }
                    }
                    Ok(())
                })?;
            }
        }

        renderer.finish(&mut writer).fs_context("writing", &output)?;
        writer.flush().fs_context("flushing", &output)?;
        drop(writer);
        guard.commit();

        report.bytes_written = std::fs::metadata(&output)
            .fs_context("reading metadata of", &output)?
            .len();

        if report.files_written == 0 {
            log::warn!(
                "No convertible files found under {}",
                request.source().display()
            );
        }
        log::info!(
            "Wrote {} file(s) to {} ({} skipped)",
            report.files_written,
            output.display(),
            report.total_skipped()
        );

        Ok(report)
    }
}

/// Run a conversion on the blocking thread pool
pub async fn convert_in_background(
    converter: Converter,
    request: LaunchRequest,
) -> Result<ConversionReport> {
    let task = tokio::task::spawn_blocking(move || converter.convert(&request));
    task.await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("target/junk.rs"), "junk").unwrap();
        fs::write(root.join("icon.png"), "not really a png").unwrap();
        dir
    }

    #[test]
    fn test_directory_conversion_inside() {
        let dir = project();
        let root = dir.path().join("demo");
        let request = LaunchRequest::resolve(&root, true, OutputFormat::Markdown, None).unwrap();

        let report = Converter::new(FilterConfig::default(), OutputFormat::Markdown)
            .convert(&request)
            .unwrap();

        assert_eq!(report.files_written, 1);
        assert_eq!(report.skipped.get(&SkipReason::IgnoredExtension), Some(&1));
        let doc = fs::read_to_string(root.join("demo.md")).unwrap();
        assert_eq!(doc, "## File: src/main.rs\n\n```rs\nfn main() {}\n\n```\n\n");
        assert_eq!(report.bytes_written, doc.len() as u64);
    }

    #[test]
    fn test_second_run_does_not_include_previous_output() {
        let dir = project();
        let root = dir.path().join("demo");
        let converter = Converter::new(FilterConfig::default(), OutputFormat::Xml);
        let request = LaunchRequest::resolve(&root, true, OutputFormat::Xml, None).unwrap();

        let first = converter.convert(&request).unwrap();
        let second = converter.convert(&request).unwrap();
        assert_eq!(first.files_written, second.files_written);
        assert_eq!(second.skipped.get(&SkipReason::OutputFile), Some(&1));
    }

    #[test]
    fn test_rejected_file_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blank.txt");
        fs::write(&file, "\n\n").unwrap();
        let request = LaunchRequest::resolve(&file, false, OutputFormat::Markdown, None).unwrap();

        let err = Converter::new(FilterConfig::default(), OutputFormat::Markdown)
            .convert(&request)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Unsupported { .. }));
        assert!(!dir.path().join("blank.txt.md").exists());
    }

    #[test]
    fn test_output_cannot_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.rs");
        fs::write(&file, "fn main() {}").unwrap();
        let request =
            LaunchRequest::resolve(&file, false, OutputFormat::Markdown, Some(&file)).unwrap();

        let err = Converter::new(FilterConfig::default(), OutputFormat::Markdown)
            .convert(&request)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Usage { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "fn main() {}");
    }

    #[tokio::test]
    async fn test_convert_in_background() {
        let dir = project();
        let root = dir.path().join("demo");
        let request = LaunchRequest::resolve(&root, false, OutputFormat::Markdown, None).unwrap();
        let converter = Converter::new(FilterConfig::default(), OutputFormat::Markdown);

        let report = convert_in_background(converter, request).await.unwrap();
        assert_eq!(
            report.output,
            dir.path().canonicalize().unwrap().join("demo.md")
        );
        assert!(report.output.exists());
    }
}
