use pagegrab::commands::command_argument_builder;
use pagegrab::{handle_grab, init_tracing};
use pagegrab_core::print_banner;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();

    init_tracing(matches.get_flag("verbose"));

    // Show banner unless --quiet flag is set
    if !matches.get_flag("quiet") {
        print_banner();
    }

    let code = handle_grab(&matches).await;
    std::process::exit(code);
}
