pub mod grab;
pub mod report;

use colored::Colorize;

pub use grab::{
    DEFAULT_OUTPUT_DIR, GrabOptions, GrabProgressCallback, execute_grab, extract_url_path,
    format_event, format_outcome,
};
pub use report::{ReportFormat, render_report, save_report};

pub fn print_banner() {
    println!(
        "{} {}",
        "pagegrab".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!("{}", "single-page resource snapshotter".dimmed());
    println!();
}
