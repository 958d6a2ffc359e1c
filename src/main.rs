//! tilegfx - resolve image-to-tile conversion options from the command line

use std::process::ExitCode;

use tilegfx::cli;

fn main() -> ExitCode {
    cli::run()
}
