use crate::config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "haas-ledger")]
#[command(about = "Hardware-as-a-Service resource ledger and membership server")]
pub struct CliConfig {
    #[arg(long, short = 'c', help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Listen address, overrides server.bind_addr")]
    pub bind_addr: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the TOML file (or defaults) and applies command-line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(addr) = &self.bind_addr {
            config.server.bind_addr = addr.clone();
        }
        if self.json_logs {
            config.logging.json = Some(true);
        }
        if self.verbose {
            config.logging.level = Some("debug".to_string());
        }

        Ok(config)
    }
}
