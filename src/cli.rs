//! Command-line interface implementation

use std::io;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::args::{resolve, Invocation};
use crate::config::{Options, VERB_CFG};
use crate::diagnostics::{Diagnostics, FatalError};
use crate::output::{version_line, ConfigReport, USAGE};
use crate::pipeline::{select_job, JsonReport, Pipeline};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TILEGFX_LOG";

/// Install the stderr log subscriber.
///
/// Filtering follows `TILEGFX_LOG` (e.g. `TILEGFX_LOG=debug`), defaulting to
/// warnings only so that normal runs print nothing but diagnostics.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    init_tracing();

    let mut diag = Diagnostics::new();
    let resolved = resolve(std::env::args_os(), &mut diag);
    print_diagnostics(&mut diag);

    match resolved {
        Ok(Invocation::Run(options)) => {
            let stdout = io::stdout();
            let mut report = JsonReport::new(stdout.lock());
            ExitCode::from(run_pipeline(&options, &mut report, &mut diag))
        }
        Ok(Invocation::PrintVersion) => {
            println!("{}", version_line());
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(Invocation::PrintHelp) => {
            print!("{}", USAGE);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => ExitCode::from(fatal(&e)),
    }
}

/// Hand resolved options to `pipeline`, unless resolution already failed.
///
/// Returns the process exit status.
pub fn run_pipeline(options: &Options, pipeline: &mut dyn Pipeline, diag: &mut Diagnostics) -> u8 {
    if options.verbosity >= VERB_CFG {
        eprint!("{}", ConfigReport(options));
    }

    // Do not do anything if option parsing went wrong
    if diag.has_errors() {
        return give_up(diag);
    }

    let job = match select_job(options) {
        Ok(job) => job,
        Err(e) => return fatal(&e),
    };
    tracing::debug!(?job, "starting pipeline");

    let result = pipeline.run(options, job, diag);
    print_diagnostics(diag);
    if let Err(e) = result {
        eprintln!("FATAL: {}", e);
        return EXIT_ERROR;
    }
    if diag.has_errors() {
        return give_up(diag);
    }
    EXIT_SUCCESS
}

fn print_diagnostics(diag: &mut Diagnostics) {
    for entry in diag.drain() {
        eprintln!("{}", entry);
    }
}

fn fatal(error: &FatalError) -> u8 {
    eprintln!("FATAL: {}", error);
    if error.shows_usage() {
        eprint!("{}", USAGE);
    }
    EXIT_ERROR
}

fn give_up(diag: &Diagnostics) -> u8 {
    let count = diag.error_count();
    eprintln!(
        "Conversion aborted after {} error{}",
        count,
        if count == 1 { "" } else { "s" }
    );
    EXIT_ERROR
}
