//! `architecture-lint [SERVICE_DIR]`
//!
//! Lints the geodata service crate. Without an argument the crate is found by
//! walking up from the current directory to the workspace that contains
//! `backend/Cargo.toml`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const SERVICE_MANIFEST: &str = "backend/Cargo.toml";

fn main() -> ExitCode {
    let Some(service_dir) = service_dir() else {
        report(&format!(
            "no {SERVICE_MANIFEST} found above the current directory; pass the service crate path"
        ));
        return ExitCode::FAILURE;
    };
    match architecture_lint::lint_service_sources(&service_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn report(message: &str) {
    // A closed stderr leaves only the exit code to carry the failure.
    writeln!(io::stderr().lock(), "{message}").ok();
}

fn service_dir() -> Option<PathBuf> {
    if let Some(explicit) = std::env::args_os().nth(1) {
        return Some(PathBuf::from(explicit));
    }
    [
        std::env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ]
    .into_iter()
    .flatten()
    .find_map(|start| find_service_dir(&start))
}

fn find_service_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(SERVICE_MANIFEST))
        .find(|manifest| manifest.is_file())
        .and_then(|manifest| manifest.parent().map(Path::to_path_buf))
}
