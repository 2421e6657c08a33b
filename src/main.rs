use std::process::ExitCode;

fn main() -> ExitCode {
    match polygonize_round::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            polygonize_round::report::print_error(&err);
            ExitCode::from(err.exit_code())
        }
    }
}
