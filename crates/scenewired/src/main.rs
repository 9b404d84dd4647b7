use std::process::ExitCode;

use scenewire_config::{ConfigError, ServerConfig};

fn main() -> ExitCode {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(ConfigError::Cli(error)) => error.exit(),
        Err(error) => {
            eprintln!("scenewired: {error}");
            return ExitCode::FAILURE;
        }
    };
    match scenewired::run_server(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("scenewired: {error}");
            ExitCode::FAILURE
        }
    }
}
