//! discord-dl - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use discord_dl::{
    api::DiscordClient,
    cli::Args,
    config::{load_channel_file, resolve_channel_ids, validate_config, Config},
    download::{Downloader, RunStats},
    error::{exit_codes, Error, Result},
    output::{print_banner, print_config_summary, print_error, print_info, print_run_stats, print_warning},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(stats) if stats.channels_failed > 0 => {
            print_warning(&format!("{} channel(s) failed", stats.channels_failed));
            ExitCode::from(exit_codes::SOME_CHANNELS_FAILED as u8)
        }
        Ok(_) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            let code = match e {
                e if e.is_config() => exit_codes::CONFIG_ERROR,
                Error::Authentication(_)
                | Error::Api(_)
                | Error::NotFound(_)
                | Error::RateLimited(_)
                | Error::ServerError(_)
                | Error::Json(_) => exit_codes::API_ERROR,
                _ => exit_codes::UNEXPECTED_ERROR,
            };
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> Result<RunStats> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    if !args.quiet {
        print_banner();
    }

    // Load configuration
    let mut config = match args.config.clone().or_else(Config::discover) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            Config::load(&path)?
        }
        None => {
            if !args.quiet {
                print_info("No configuration file found, using CLI arguments");
            }
            Config::default()
        }
    };

    // Merge CLI arguments into config
    let quiet = args.quiet;
    args.merge_into_config(&mut config);

    // Collect channel ids from arguments, config and the id file
    let mut inputs = std::mem::take(&mut config.channels.ids);
    if let Some(file) = &config.channels.file {
        inputs.extend(load_channel_file(file)?);
    }
    config.channels.ids = resolve_channel_ids(&inputs);

    tracing::debug!("Effective configuration: {:?}", config.redacted());

    // Validate configuration
    validate_config(&config)?;

    if !quiet {
        print_config_summary(&config);
    }

    let client = DiscordClient::new(config.account.token.clone())?;
    let stats = Downloader::new(&client, &client, &config).run().await?;

    if config.output.show_stats {
        print_run_stats(&stats);
    }

    Ok(stats)
}
