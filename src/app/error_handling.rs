//! Error handling utilities

use tracing::error;

/// Handle fatal errors and exit with appropriate status code
///
/// - For crate `Error`s: exit code comes from [`crate::error::Error::exit_code`]
/// - For other errors: exit code 1
///
/// With `verbose >= 1` the full error chain is printed.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code(&error))
}

/// Exit code for an error returned from a command
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<crate::error::Error>())
        .map(crate::error::Error::exit_code)
        .unwrap_or(1)
}
