pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    EXIT_OK, EXIT_PAGE_UNREACHABLE, EXIT_PARTIAL, exit_code_for, handle_grab, init_tracing,
    parse_url_line, resolve_target,
};

// Re-export grab functionality from pagegrab-core
pub use pagegrab_core::grab::{GrabOptions, GrabProgressCallback, execute_grab};
