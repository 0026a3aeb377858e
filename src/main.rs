use std::sync::Arc;

use apple_signin::{
    config::{self, args::RunMode, Config},
    coordinator::SignInCoordinator,
    test::{simulator::SimulatedPlatform, TestRunner},
    token,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match config::get_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config loading failed: {:?}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let success = match config.mode().clone() {
        RunMode::Decode { token } => decode(&token),
        RunMode::Available => {
            let platform = Arc::new(SimulatedPlatform::new(config.os_version()));
            let coordinator = SignInCoordinator::builder(platform)
                .minimum_version(config.minimum_version())
                .build();
            println!(
                "Sign in with Apple available on platform version {}: {}",
                config.os_version(),
                coordinator.is_available()
            );
            true
        }
        RunMode::Test(test_mode) => match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime
                .block_on(async { TestRunner::new(config, test_mode).run().await })
                .success(),
            Err(e) => {
                error!("Tokio runtime creation failed: {}", e);
                false
            }
        },
    };

    if !success {
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) {
    let default_level = if config.debug_mode() { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn decode(token: &str) -> bool {
    token::log_header(token);
    let claims = match token::decode_payload_segment(token) {
        Ok(claims) => claims,
        Err(e) => {
            error!("Token decoding failed: {:?}", e);
            return false;
        }
    };
    match serde_json::to_string_pretty(&claims) {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(e) => {
            error!("Claims printing failed: {}", e);
            false
        }
    }
}
