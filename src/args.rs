use crate::config::ChartsworthConfig;
use crate::error::Result;
use clap::{ArgAction, Args};
use std::path::PathBuf;

// Global flags shared across every subcommand:
//   -c / --config   Path to a config.toml file
//   --channel       Channel to post into (overrides the configured default)
//   --base          Notebook deployment host used for links
//   -v / --verbose  Debug logging
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to a config.toml file (default: ~/.chartsworth/config.toml)
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        env = "CHARTSWORTH_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Channel name or ID to post into
    #[arg(long, value_name = "CHANNEL", global = true)]
    pub channel: Option<String>,

    /// Notebook deployment host, e.g. app.noteable.io
    #[arg(long = "base", value_name = "HOST", global = true)]
    pub base_deployment: Option<String>,

    /// Debug logging
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Config file, then `CHARTSWORTH_*` variables, then command-line flags.
    pub fn load_config(&self) -> Result<ChartsworthConfig> {
        let mut config = ChartsworthConfig::load(self.config.as_deref())?;
        config.apply_env();
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ChartsworthConfig) {
        if let Some(channel) = &self.channel {
            config.default_channel = Some(channel.clone());
        }
        if let Some(base) = &self.base_deployment {
            config.base_deployment = base.clone();
        }
    }
}
