//! Snowfield viewer.
//!
//! Usage: `snowfield [config.json]`
//!
//! Without a config file the built-in defaults are used. Set `RUST_LOG` to
//! change log verbosity.

use std::env;
use std::process::ExitCode;

use snowfield::{Snowfield, SnowfieldConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("snowfield=info,warn"))
        .init();

    let config = match env::args().nth(1) {
        Some(path) => match SnowfieldConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => SnowfieldConfig::default(),
    };

    match Snowfield::from_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
