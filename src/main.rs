//! sfmt - Parallel formatting front-end for tree-structured source files

use std::process::ExitCode;

fn main() -> ExitCode {
    match sfmt::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
