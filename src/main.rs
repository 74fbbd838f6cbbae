use std::process::ExitCode;

use sortcopy::cli;
use sortcopy::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::from(app::EXIT_CONFIG)
        }
    }
}
