use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "vmc_receiver", version)]
#[command(about = "Receives VMC motion data over OSC/UDP and drives a skeleton")]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:39539
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Start with ingestion frozen
    #[arg(long)]
    pub freeze: bool,

    /// Disable the per-tick rate limiter
    #[arg(long)]
    pub no_rate_limit: bool,

    /// Frames per tick above which the next tick is dropped
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Log level or filter directives
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Flags that were given win over the config file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = self.bind {
            config.transport.listen_addr = bind;
        }
        if self.freeze {
            config.receiver.freeze = true;
        }
        if self.no_rate_limit {
            config.receiver.rate_limit_enabled = false;
        }
        if let Some(threshold) = self.threshold {
            config.receiver.rate_limit_threshold = threshold;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
