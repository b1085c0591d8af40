use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pagegrab_scanner::result::{ItemKind, ItemOutcome, ItemStatus, SpiderReport};
use pagegrab_scanner::{ScanError, Spider, SpiderEvent, WELL_KNOWN_FILES};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Where downloads land when no output directory is given
pub const DEFAULT_OUTPUT_DIR: &str = "DownloadedResources";

/// Options for configuring a grab operation
pub struct GrabOptions {
    pub url: Url,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub timeout: Option<Duration>,
    pub show_progress_bars: bool,
}

impl GrabOptions {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: 1,
            timeout: None,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting grab progress, one console line per call
pub type GrabProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Last path segment of a URL, used to name well-known files in messages
fn file_name(url: &str) -> String {
    extract_url_path(url)
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Render a spider event as a console line
pub fn format_event(event: &SpiderEvent) -> String {
    match event {
        SpiderEvent::PageFetched { url, bytes } => format!(
            "{} Fetched {} ({} bytes)",
            "✓".green().bold(),
            url,
            bytes
        ),
        SpiderEvent::Discovered {
            resources,
            api_calls,
        } => format!(
            "{} Found {} resources and {} API calls",
            "→".blue(),
            resources,
            api_calls
        ),
        SpiderEvent::ItemStarted { kind, url } => match kind {
            ItemKind::ApiCall => format!("{} Calling API: {}", "→".blue(), url),
            ItemKind::Resource => format!("{} Downloading: {}", "→".blue(), url),
            ItemKind::WellKnown => {
                format!("{} Checking for {} at: {}", "→".blue(), file_name(url), url)
            }
        },
        SpiderEvent::ItemFinished(outcome) => format_outcome(outcome),
    }
}

/// One console line describing how an item ended
pub fn format_outcome(outcome: &ItemOutcome) -> String {
    match outcome.status {
        ItemStatus::Saved => {
            let path = outcome
                .local_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            match outcome.replaces {
                Some(ref previous) => format!(
                    "  {} Saved to: {} (replaced {})",
                    "✓".green(),
                    path,
                    previous
                ),
                None => format!("  {} Saved to: {}", "✓".green(), path),
            }
        }
        ItemStatus::Missing => format!(
            "  {} No {} file found ({})",
            "-".yellow(),
            file_name(&outcome.url),
            outcome.status_code.unwrap_or_default()
        ),
        ItemStatus::Failed => format!(
            "  {} Failed to process {}: {}",
            "✗".red().bold(),
            outcome.url,
            outcome.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Execute a grab with the given options
/// Returns the spider report, or the fatal error that stopped the run
pub async fn execute_grab(
    options: GrabOptions,
    progress_callback: Option<GrabProgressCallback>,
) -> Result<SpiderReport, ScanError> {
    let GrabOptions {
        url,
        output_dir,
        workers,
        timeout,
        show_progress_bars,
    } = options;

    // Single spinner for overall progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| ScanError::Other(format!("Invalid progress template: {}", e)))?,
        );
        pb.set_message(format!("Fetching {}...", url));
        Some(Arc::new(pb))
    } else {
        None
    };

    let total_items = Arc::new(AtomicUsize::new(WELL_KNOWN_FILES.len()));
    let finished_items = Arc::new(AtomicUsize::new(0));

    let pb_clone = progress_bar.clone();
    let total_clone = total_items.clone();
    let finished_clone = finished_items.clone();
    let internal_callback: pagegrab_scanner::ProgressCallback = Arc::new(move |event: SpiderEvent| {
        match &event {
            SpiderEvent::Discovered {
                resources,
                api_calls,
            } => {
                total_clone.fetch_add(resources + api_calls, Ordering::Relaxed);
            }
            SpiderEvent::ItemFinished(_) => {
                finished_clone.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        if let Some(ref pb) = pb_clone {
            pb.set_message(format!(
                "Grabbing... {}/{} items",
                finished_clone.load(Ordering::Relaxed),
                total_clone.load(Ordering::Relaxed)
            ));
            pb.tick();
        }

        if let Some(ref callback) = progress_callback {
            let line = format_event(&event);
            match pb_clone {
                Some(ref pb) => pb.suspend(|| callback(line)),
                None => callback(line),
            }
        }
    });

    let spider = Spider::with_timeout(output_dir, timeout)?
        .with_workers(workers)
        .with_progress_callback(internal_callback);

    let result = spider.spider(&url).await;

    if let Some(ref pb) = progress_bar {
        match &result {
            Ok(report) => pb.finish_with_message(format!(
                "Grab complete! {} items, {} failed",
                finished_items.load(Ordering::Relaxed),
                report.failed_count()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}
