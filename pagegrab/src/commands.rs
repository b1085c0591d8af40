use clap::{arg, command};
use pagegrab_core::DEFAULT_OUTPUT_DIR;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    command!()
        .name("pagegrab")
        .bin_name("pagegrab")
        .about(
            "Download a web page's same-origin resources, inline API calls and well-known \
            site files into a local directory.",
        )
        .styles(CLAP_STYLING)
        .arg(
            arg!([URL])
                .required(false)
                .help("The page to grab. Read from standard input when omitted."),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Directory the downloaded files are written to")
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            arg!(-w --"workers" <NUM_WORKERS>)
                .required(false)
                .help("Concurrent downloads within the API and resource stages (1 = sequential)")
                .value_parser(clap::value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Per-request timeout in seconds (default: none)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Summary format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(--"report" <PATH>)
                .required(false)
                .help("Save the summary to a file instead of printing it")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and per-item output").required(false))
        .arg(arg!(-v --"verbose" "Emit debug tracing on stderr").required(false))
}
