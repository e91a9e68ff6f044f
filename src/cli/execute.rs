//! Conversion command execution.
//!
//! Resolves the launch request, runs the conversion off the async runtime,
//! and reports the result. Failures are printed here and turned into exit
//! codes so `main` only sees errors it cannot describe itself.

use crate::cli::{Args, RuntimeConfig};
use crate::convert::{ConversionReport, Converter, convert_in_background};
use crate::error::{ConvertError, EXIT_SUCCESS, EXIT_USAGE, Result};
use crate::request::LaunchRequest;

/// Execute a conversion based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(EXIT_USAGE);
    }

    let config = RuntimeConfig::from(&args);

    match execute_convert(&args, &config).await {
        Ok(report) => {
            print_report(&report, &config)?;
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            report_failure(&e, &config);
            Ok(e.exit_code())
        }
    }
}

async fn execute_convert(args: &Args, config: &RuntimeConfig) -> Result<ConversionReport> {
    let request = LaunchRequest::resolve(
        &args.path,
        args.inside,
        config.format,
        args.output.as_deref(),
    )?;

    // stdout carries only the report in JSON mode
    if !config.json {
        let _ = config.output().info(&format!(
            "Converting {} {}",
            request.kind(),
            request.source().display()
        ));
        config.verbose_println(&format!(
            "Format {}, size limit {} bytes, output {}",
            config.format,
            config.filter.max_file_size,
            request.output_path().display()
        ));
    }

    let converter = Converter::new(config.filter.clone(), config.format);
    convert_in_background(converter, request).await
}

fn print_report(report: &ConversionReport, config: &RuntimeConfig) -> Result<()> {
    if config.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.files_written == 0 {
        config.warning_println("No convertible files found; the document is empty");
    }
    config.success_println(&format!(
        "Wrote {} file(s) to {}",
        report.files_written,
        report.output.display()
    ));

    if report.total_skipped() > 0 {
        let summary = report
            .skipped
            .iter()
            .map(|(reason, count)| format!("{} {}", count, reason))
            .collect::<Vec<_>>()
            .join(", ");
        let total = report.total_skipped();
        config.println(&format!("Skipped {total} file(s): {summary}"));
    }

    if config.is_verbose() {
        for (path, reason) in &report.skipped_files {
            config.indent(&format!("{} ({})", path.display(), reason));
        }
    }

    Ok(())
}

fn report_failure(error: &ConvertError, config: &RuntimeConfig) {
    log::debug!("Conversion failed: {:?}", error);
    config.error_println(&error.to_string());

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        config.output().error_detail("");
        config.output().error_detail("💡 Recovery suggestions:");
        for suggestion in suggestions {
            config.output().error_detail(&format!("  • {}", suggestion));
        }
    }
}
