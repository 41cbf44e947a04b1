use anyhow::Context;
use clap::Parser;
use haas_ledger::utils::logger;
use haas_ledger::utils::validation::Validate;
use haas_ledger::{CliConfig, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting haas-ledger");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let server = Server::new(config).context("failed to initialise resource service")?;
    server.run().await.context("server terminated with an error")?;

    tracing::info!("✅ haas-ledger stopped cleanly");
    Ok(())
}
