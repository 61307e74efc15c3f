//! Config validation CLI tool
//!
//! Validates a washline configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use washline_config::RoomPolicy;
use washline_util::default_config_path;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a washline configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!(
            "Error: Configuration file not found: {}",
            config_path.display()
        );
        return ExitCode::from(1);
    }

    match washline_config::load_config(&config_path) {
        Ok(policy) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!(
                "  Config version: {}",
                washline_config::CURRENT_CONFIG_VERSION
            );
            println!("  Backend: {:?}", policy.service.backend);
            let floors: Vec<String> = policy
                .queue
                .floors
                .iter()
                .map(|f| f.to_string())
                .collect();
            println!("  Floors: {}", floors.join(", "));
            println!(
                "  Max entries per day: {}",
                policy.queue.max_entries_per_day
            );
            println!(
                "  Stale after: {} hours",
                policy.queue.stale_after.num_hours()
            );
            println!(
                "  Next-day sign-up opens at: {}",
                policy.queue.next_day_opens_at
            );
            match policy.rooms {
                RoomPolicy::Flat { min, max } => {
                    println!("  Rooms: flat range {}-{}", min, max);
                }
                RoomPolicy::Dorm => {
                    println!("  Rooms: dormitory layout (floors 2-10)");
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                washline_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                washline_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                washline_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                washline_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        washline_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
