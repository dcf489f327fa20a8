// sqldump2table: extract rows from SQL dump INSERT statements and write
// them as CSV, Markdown or a JSON preview.

use clap::Parser;
use sqldump2table::converter::{ConvertOptions, Converter, DEFAULT_MAX_INPUT_BYTES};
use sqldump2table::export::OutputFormat;
use sqldump2table::{logger, progress};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

// Command-line flags and positional arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable debug logging (disables progress bars).
    #[arg(long)]
    debug: bool,

    /// Output format.
    #[arg(long, short, value_enum, ignore_case = true, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Directory for output files. If omitted, output goes to stdout.
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Rows included in the JSON preview.
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,

    /// Reject input files larger than this many MiB.
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_BYTES / (1024 * 1024))]
    max_input_mb: u64,

    /// Max concurrent file conversions (0 = num CPU).
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// SQL dump files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let wall_start = Instant::now();
    let args = Args::parse();

    logger::init(args.debug);
    logger::debug(&format!("main: {} input files", args.inputs.len()));

    let options = ConvertOptions {
        format: args.format,
        output_dir: args.output_dir.clone(),
        preview_rows: args.preview_rows,
        max_input_bytes: args.max_input_mb.saturating_mul(1024 * 1024),
        workers: args.workers,
    };

    // Progress bars are disabled in debug mode to avoid mangled output.
    let progress = progress::ProgressManager::new(!logger::is_debug() && args.output_dir.is_some());
    let converter = Converter::new(options);
    let (results, summary) = converter.convert_all(&args.inputs, &progress)?;

    {
        let mut stdout = io::stdout().lock();
        for report in results.iter().flatten() {
            if let Some(out) = &report.output {
                logger::info(&format!(
                    "{} -> {} ({} rows)",
                    report.input.display(),
                    out.display(),
                    report.rows
                ));
            }
            if let Some(rendered) = &report.rendered {
                stdout.write_all(rendered)?;
            }
        }
        stdout.flush()?;
    }

    let sep = "=".repeat(60);
    {
        let mut stderr = io::stderr();
        writeln!(stderr, "\n{}\nSUMMARY\n{}", sep, sep)?;
        writeln!(stderr, "Converted: {}", summary.files_converted)?;
        writeln!(stderr, "Failed:    {}", summary.files_failed)?;
        writeln!(stderr, "Rows:      {}", summary.rows)?;
        writeln!(stderr, "Skipped:   {}", summary.skipped_statements)?;
        writeln!(stderr, "{}", sep)?;
    }
    logger::debug(&format!("Timing: total wall time {:?}", wall_start.elapsed()));

    if summary.files_failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_required() {
        let err = Args::try_parse_from(["sqldump2table"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn format_accepts_aliases_and_rejects_unknown() {
        let args = Args::try_parse_from(["sqldump2table", "-f", "Markdown", "a.sql"]).unwrap();
        assert_eq!(args.format, OutputFormat::Markdown);
        let args = Args::try_parse_from(["sqldump2table", "a.sql"]).unwrap();
        assert_eq!(args.format, OutputFormat::Csv);
        let err = Args::try_parse_from(["sqldump2table", "-f", "xlsx", "a.sql"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
