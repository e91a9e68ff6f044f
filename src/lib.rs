//! # code2xml
//!
//! Flatten a project directory, or a single source file, into one Markdown
//! or XML document that can be pasted into a review, an issue, or a prompt.
//!
//! ## Features
//!
//! - **Shell friendly**: the two Explorer launch forms (`<file>` and `<dir> -i`) work as-is
//! - **Noise filtering**: VCS metadata, dependency caches, build output, lockfiles,
//!   media and binaries are left out
//! - **Deterministic**: files appear depth-first in file-name order
//! - **Two formats**: Markdown fenced blocks (default) or XML with CDATA content
//!
//! ## Usage
//!
//! ```bash
//! code2xml src/main.rs          # writes src/main.rs.md
//! code2xml ~/projects/demo -i   # writes ~/projects/demo/demo.md
//! code2xml . --format xml -o /tmp/demo.xml
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod collect;
pub mod convert;
pub mod error;
pub mod filter;
pub mod render;
pub mod request;

pub use cli::Args;
pub use collect::{Collector, SourceFile};
pub use convert::{ConversionReport, Converter};
pub use error::{ConvertError, Result};
pub use filter::{FileFilter, FilterConfig, SkipReason};
pub use render::OutputFormat;
pub use request::{LaunchRequest, RequestKind};
