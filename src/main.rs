use clap::Parser;
use std::time::{Duration, Instant};
use twin_resolver::utils::{logger, validation::Validate};
use twin_resolver::{CliConfig, ModelParser, ModelRepositoryClient, ModelResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting twin-resolver CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let repository = ModelRepositoryClient::from_settings(&config)?;

    let mut parser = ModelParser::new().with_max_depth(config.max_depth);
    if let Some(seconds) = config.resolution_timeout_seconds {
        parser = parser.with_deadline(Instant::now() + Duration::from_secs(seconds));
    }

    let resolver = ModelResolver::with_parser(repository, parser);

    match resolver.describe(&config.dtmi).await {
        Ok(description) => {
            tracing::info!(
                "✅ Resolved {}: {} telemetry, {} command(s)",
                description.model_id,
                description.telemetry.len(),
                description.commands.len()
            );
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Err(e) => {
            tracing::error!("❌ Model resolution failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
