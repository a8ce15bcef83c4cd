use super::{Command, Context};

/// Show the commission rates after merging config, environment and flags.
#[derive(Debug, clap::Args)]
pub struct Rates {}

impl Command for Rates {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let config = ctx.config();
        let rates = config.rates()?;
        println!("{}", config.format().display_rates(&rates)?);
        Ok(())
    }
}
