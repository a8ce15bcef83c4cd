use std::path::Path;

use enum_dispatch::enum_dispatch;

use crate::config::Config;

mod compute;
mod init_config;
mod rates;

use compute::Compute;
use init_config::InitConfig;
use rates::Rates;

/// Commands.
#[enum_dispatch]
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Initialize config file.
    InitConfig(InitConfig),
    /// Compute the downline report of a user.
    Compute(Compute),
    /// Show the effective commission rates.
    Rates(Rates),
}

#[enum_dispatch(Commands)]
pub(crate) trait Command {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()>;
}

/// Execution context.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    config_path: &'a Path,
    config: &'a Config,
}

impl<'a> Context<'a> {
    pub(super) fn new(config_path: &'a Path, config: &'a Config) -> Self {
        Self {
            config_path,
            config,
        }
    }

    pub(crate) fn config_path(&self) -> &'a Path {
        self.config_path
    }

    pub(crate) fn config(&self) -> &'a Config {
        self.config
    }
}
