//! Config validation CLI tool
//!
//! Validates a lectern configuration file and reports any errors.

use lectern_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: check-config [config-file]");
            eprintln!();
            eprintln!("Validates a lectern configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  check-config {}", default_path.display());
            eprintln!("  check-config config.example.toml");
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

    match lectern_config::load_config(&config_path) {
        Ok(policy) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!(
                "  Config version: {}",
                lectern_config::CURRENT_CONFIG_VERSION
            );
            println!(
                "  Join grace: {} before, {} after",
                format_duration(policy.join_grace_before),
                format_duration(policy.join_grace_after)
            );
            if policy.ask_grace_after.is_zero() {
                println!("  Ask window: strict (live only)");
            } else {
                println!(
                    "  Ask window: live + {} after natural end",
                    format_duration(policy.ask_grace_after)
                );
            }
            println!("  Max question length: {} chars", policy.max_question_chars);
            println!("  Data dir: {}", policy.service.data_dir.display());

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                lectern_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                lectern_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                lectern_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                lectern_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        lectern_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
