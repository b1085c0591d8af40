use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use pagegrab_core::grab::{GrabOptions, GrabProgressCallback, execute_grab};
use pagegrab_core::report::{ReportFormat, render_report, save_report};
use pagegrab_core::DEFAULT_OUTPUT_DIR;
use pagegrab_scanner::{ScanError, SpiderReport};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Every stage ran and every item was saved (or was simply absent)
pub const EXIT_OK: i32 = 0;
/// The target page could not be fetched, or no usable URL was given
pub const EXIT_PAGE_UNREACHABLE: i32 = 1;
/// The run completed but at least one item failed
pub const EXIT_PARTIAL: i32 = 2;

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<Url> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(url);
    }

    // Try adding http://
    Url::parse(&format!("http://{}", line))
        .ok()
        .filter(|url| url.has_host())
}

/// The target page, from the positional argument or, failing that, one
/// line read from `input`.
pub fn resolve_target(arg: Option<&str>, input: &mut impl BufRead) -> anyhow::Result<Url> {
    let raw = match arg {
        Some(arg) => arg.to_string(),
        None => {
            println!("Please provide a URL.");
            io::stdout().flush().context("Failed to flush stdout")?;

            let mut line = String::new();
            input
                .read_line(&mut line)
                .context("Failed to read URL from standard input")?;
            line
        }
    };

    match parse_url_line(&raw) {
        Some(url) => Ok(url),
        None => bail!("'{}' is not a valid URL", raw.trim()),
    }
}

pub fn exit_code_for(result: &Result<SpiderReport, ScanError>) -> i32 {
    match result {
        Ok(report) if report.has_failures() => EXIT_PARTIAL,
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_PAGE_UNREACHABLE,
    }
}

pub fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::ERROR
    };

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_report(report: &SpiderReport, format: ReportFormat, path: Option<&PathBuf>) -> anyhow::Result<()> {
    let rendered = render_report(report, format).map_err(anyhow::Error::msg)?;

    match path {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{} Report saved to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn expand_output_dir(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    Path::new(expanded.as_ref()).to_path_buf()
}

pub async fn handle_grab(args: &ArgMatches) -> i32 {
    let quiet = args.get_flag("quiet");

    let url = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        match resolve_target(args.get_one::<String>("URL").map(String::as_str), &mut input) {
            Ok(url) => url,
            Err(e) => {
                eprintln!("{} {:#}", "✗".red().bold(), e);
                return EXIT_PAGE_UNREACHABLE;
            }
        }
    };

    let output_dir = expand_output_dir(
        args.get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_DIR),
    );
    let workers = *args.get_one::<usize>("workers").unwrap_or(&1);
    let timeout = args.get_one::<u64>("timeout").map(|secs| Duration::from_secs(*secs));
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let report_path = args.get_one::<PathBuf>("report");

    if !quiet {
        println!("Starting resource download...");
        println!("Target: {}", url);
        println!("Output: {}", output_dir.display());
        println!("Workers: {}\n", workers);
    }

    let options = GrabOptions {
        url,
        output_dir,
        workers,
        timeout,
        show_progress_bars: !quiet,
    };

    let progress_callback: Option<GrabProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|line: String| {
            println!("{}", line);
        }))
    };

    let result = execute_grab(options, progress_callback).await;
    let code = exit_code_for(&result);

    match result {
        Ok(report) => {
            if !quiet {
                println!("\n{} Resource download completed.\n", "✓".green().bold());
            }
            if let Err(e) = emit_report(&report, format, report_path) {
                eprintln!("{} {:#}", "✗".red().bold(), e);
            }
        }
        Err(e) => {
            eprintln!("{} Error: {}", "✗".red().bold(), e);
        }
    }

    code
}
