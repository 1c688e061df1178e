use std::process::ExitCode;

use env_logger::Env;

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    match rate_form::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
