//! Command line argument parsing and validation.
//!
//! The Explorer integration only ever passes a path and, for directory
//! backgrounds, `-i`. Everything else is for use from a terminal.

use crate::filter::{DEFAULT_MAX_FILE_SIZE, FilterConfig};
use crate::render::OutputFormat;
use clap::Parser;
use std::path::{MAIN_SEPARATOR, PathBuf};

/// Flatten a project into one Markdown or XML document
#[derive(Parser, Debug, Clone)]
#[command(
    name = "code2xml",
    version,
    about = "Flatten a project directory or source file into one document",
    long_about = "Collect the readable source files below a path into a single document.

Usage:
  code2xml <file>          write <file>.md next to the file
  code2xml <dir>           write <dir>.md next to the directory
  code2xml <dir> -i        write <dir>.md inside the directory"
)]
pub struct Args {
    /// File or directory to convert
    #[arg(index = 1, value_name = "PATH")]
    pub path: PathBuf,

    /// Save the document inside the directory instead of next to it
    #[arg(short = 'i', long = "inside")]
    pub inside: bool,

    /// Write the document to this file instead
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Document format
    #[arg(short, long, value_enum, default_value_t, env = "CODE2XML_FORMAT")]
    pub format: OutputFormat,

    /// Skip files larger than this many bytes
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_FILE_SIZE,
        env = "CODE2XML_MAX_FILE_SIZE"
    )]
    pub max_file_size: u64,

    /// Also walk hidden directories (VCS and IDE directories stay ignored)
    #[arg(long)]
    pub hidden: bool,

    /// Print the conversion report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List every skipped file
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse().normalize()
    }

    /// Repair a drive root mangled by Windows command-line quoting.
    ///
    /// The background menu runs `code2xml "C:\" -i`, where `\"` reads as an
    /// escaped quote, so the program receives the single argument `C:" -i`.
    pub fn normalize(mut self) -> Self {
        let Some(raw) = self.path.to_str() else {
            return self;
        };
        let (quoted, inside) = match raw.strip_suffix(" -i") {
            Some(rest) if rest.ends_with('"') => (rest, true),
            _ => (raw, false),
        };
        if let Some(root) = quoted.strip_suffix('"').filter(|r| !r.is_empty()) {
            log::debug!("Repairing quoted path argument {:?}", raw);
            self.path = PathBuf::from(format!("{root}{MAIN_SEPARATOR}"));
            self.inside |= inside;
        }
        self
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("PATH must not be empty".to_string());
        }
        if self.max_file_size == 0 {
            return Err("--max-file-size must be greater than zero".to_string());
        }
        if let Some(output) = &self.output
            && output.as_os_str().is_empty()
        {
            return Err("--output must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
    /// Filter settings for the walk
    pub filter: FilterConfig,
    /// Document format
    pub format: OutputFormat,
    /// Print the report as JSON
    pub json: bool,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
            filter: FilterConfig {
                max_file_size: args.max_file_size,
                include_hidden: args.hidden,
            },
            format: args.format,
            json: args.json,
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message (only with --verbose)
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_invocation() {
        let args = Args::try_parse_from(["code2xml", "C:\\src\\main.rs"]).unwrap();
        assert_eq!(args.path, PathBuf::from("C:\\src\\main.rs"));
        assert!(!args.inside);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_directory_background_invocation() {
        let args = Args::try_parse_from(["code2xml", "C:\\projects\\demo", "-i"]).unwrap();
        assert!(args.inside);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_flag_before_path() {
        let args = Args::try_parse_from(["code2xml", "-i", "demo"]).unwrap();
        assert!(args.inside);
        assert_eq!(args.path, PathBuf::from("demo"));
    }

    #[test]
    fn test_missing_path_is_usage_error() {
        let err = Args::try_parse_from(["code2xml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_quoted_drive_root_with_inside_flag() {
        let args = Args::try_parse_from(["code2xml", "C:\" -i"])
            .unwrap()
            .normalize();
        assert!(args.inside);
        assert_eq!(args.path, PathBuf::from(format!("C:{MAIN_SEPARATOR}")));
    }

    #[test]
    fn test_quoted_drive_root_without_flag() {
        let args = Args::try_parse_from(["code2xml", "D:\""])
            .unwrap()
            .normalize();
        assert!(!args.inside);
        assert_eq!(args.path, PathBuf::from(format!("D:{MAIN_SEPARATOR}")));
    }

    #[test]
    fn test_normalize_leaves_plain_paths_alone() {
        let args = Args::try_parse_from(["code2xml", "notes -i"])
            .unwrap()
            .normalize();
        assert!(!args.inside);
        assert_eq!(args.path, PathBuf::from("notes -i"));

        let args = Args::try_parse_from(["code2xml", "C:\\src", "-i"])
            .unwrap()
            .normalize();
        assert!(args.inside);
        assert_eq!(args.path, PathBuf::from("C:\\src"));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["code2xml", "demo", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_zero_size_limit_is_rejected() {
        let args = Args::try_parse_from(["code2xml", "demo", "--max-file-size", "0"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_runtime_config_from_args() {
        let args =
            Args::try_parse_from(["code2xml", "demo", "--format", "xml", "--hidden", "--json"])
                .unwrap();
        let config = RuntimeConfig::from(&args);
        assert_eq!(config.format, OutputFormat::Xml);
        assert!(config.filter.include_hidden);
        assert!(config.json);
        assert!(!config.is_quiet());
    }
}
