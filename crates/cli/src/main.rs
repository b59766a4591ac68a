use std::process::ExitCode;

fn main() -> ExitCode {
    quotecalc_cli::run()
}
