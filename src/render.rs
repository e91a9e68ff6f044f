//! Document renderers.
//!
//! A renderer turns the stream of collected files into one document. The
//! Markdown layout is one `## File:` heading and one fenced block per file;
//! the XML layout wraps each file in a `<file>` element with CDATA content.

use crate::collect::SourceFile;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown with fenced code blocks
    #[default]
    Markdown,
    /// XML with one element per file
    Xml,
}

impl OutputFormat {
    /// File extension of documents in this format (no dot)
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Xml => "xml",
        }
    }

    /// Renderer producing this format
    pub fn renderer(&self) -> Box<dyn DocumentRenderer> {
        match self {
            OutputFormat::Markdown => Box::new(MarkdownRenderer),
            OutputFormat::Xml => Box::new(XmlRenderer),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => f.write_str("markdown"),
            OutputFormat::Xml => f.write_str("xml"),
        }
    }
}

/// Writes a document in three phases: header, one entry per file, footer
pub trait DocumentRenderer {
    /// Write anything that precedes the first file
    fn begin(&self, out: &mut dyn Write, title: &str) -> io::Result<()>;

    /// Write one file entry
    fn file(&self, out: &mut dyn Write, file: &SourceFile) -> io::Result<()>;

    /// Write anything that follows the last file
    fn finish(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Markdown renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn begin(&self, _out: &mut dyn Write, _title: &str) -> io::Result<()> {
        Ok(())
    }

    fn file(&self, out: &mut dyn Write, file: &SourceFile) -> io::Result<()> {
        let fence = code_fence(&file.content);
        writeln!(out, "## File: {}\n", file.relative_path)?;
        writeln!(out, "{}{}", fence, file.extension)?;
        writeln!(out, "{}", file.content)?;
        writeln!(out, "{}\n", fence)
    }

    fn finish(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

/// Backtick fence one longer than the longest backtick run in `content`, minimum three
fn code_fence(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// XML renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRenderer;

impl DocumentRenderer for XmlRenderer {
    fn begin(&self, out: &mut dyn Write, title: &str) -> io::Result<()> {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<project name="{}">"#, escape_attr(title))
    }

    fn file(&self, out: &mut dyn Write, file: &SourceFile) -> io::Result<()> {
        writeln!(
            out,
            r#"  <file path="{}" language="{}"><![CDATA[{}]]></file>"#,
            escape_attr(&file.relative_path),
            escape_attr(&file.extension),
            escape_cdata(&file.content)
        )
    }

    fn finish(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "</project>")
    }
}

/// Characters XML 1.0 allows in a document
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => escaped.push('\u{FFFD}'),
        }
    }
    escaped
}

/// `]]>` cannot appear inside CDATA, so it is split across two sections
fn escape_cdata(content: &str) -> String {
    content
        .chars()
        .map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' })
        .collect::<String>()
        .replace("]]>", "]]]]><![CDATA[>")
}
