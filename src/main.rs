//! Sprite Studio - command-line entry point.

use std::process::ExitCode;

use sprite_studio::cli;

fn main() -> ExitCode {
    env_logger::init();
    cli::run()
}
