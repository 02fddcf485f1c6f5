//! flk - command-line tool for editing fractal flame genomes

use std::process::ExitCode;

use flamekit::cli;

fn main() -> ExitCode {
    cli::run()
}
