//! Entrypoint for the `mcpid` session server.
//!
//! Delegates to [`mcpid::run_server`], which loads configuration, serves
//! sessions until a shutdown signal arrives, and then closes every session.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match mcpid::run_server() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "mcpid: {error}").ok();
            ExitCode::FAILURE
        }
    }
}
