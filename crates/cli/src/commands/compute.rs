use std::path::Path;

use downline_model::{
    cancellation, store::Dataset, DownlineEngine, MemoryStore, UserId,
};
use tokio::fs;

use super::{Command, Context};

/// Compute the downline report of a user.
#[derive(Debug, clap::Args)]
pub struct Compute {
    /// The root user.
    root: UserId,
    /// Also list the members of every level.
    #[arg(long)]
    members: bool,
}

impl Command for Compute {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let config = ctx.config();
        let rates = config.rates()?;
        let engine_config = config.engine_config()?;
        let store = load_store(&config.dataset_path()?).await?;
        tracing::debug!(
            users = store.user_count(),
            investments = store.investment_count(),
            "dataset loaded"
        );

        let engine = DownlineEngine::with_config(store, engine_config);
        let (handle, cancel) = cancellation();
        let watcher = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received `ctrl + c`, cancelling...");
                    handle.cancel();
                }
                Err(err) => {
                    tracing::error!(%err, "Failed to setup signal handler");
                }
            }
        });

        let res = engine
            .compute_downline_with_cancel(&self.root, &rates, &cancel)
            .await;
        watcher.abort();
        let report = res?;

        println!("{}", config.format().display_report(&report, self.members)?);
        Ok(())
    }
}

async fn load_store(path: &Path) -> eyre::Result<MemoryStore> {
    let content = fs::read_to_string(path).await.map_err(|err| {
        eyre::eyre!("failed to read dataset `{}`: {err}", path.display())
    })?;
    let dataset: Dataset = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        Some("json") | None => serde_json::from_str(&content)?,
        Some(ext) => eyre::bail!("unsupported dataset format: `{ext}`"),
    };
    Ok(MemoryStore::try_from(dataset)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_json_dataset() -> eyre::Result<()> {
        let dir = std::env::temp_dir().join(format!("downline-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).await?;
        let path = dir.join("network.json");
        fs::write(
            &path,
            r#"{
                "users": [
                    {"id": "r", "name": "R", "email": "r@example.com", "joined_date": "2024-01-01T00:00:00Z"},
                    {"id": "x", "name": "X", "email": "x@example.com", "joined_date": "2024-01-02T00:00:00Z", "referred_by": "r"}
                ],
                "investments": [
                    {"user": "x", "amount": "10", "status": "active"}
                ]
            }"#,
        )
        .await?;
        let store = load_store(&path).await?;
        assert_eq!(store.user_count(), 2);
        assert_eq!(store.investment_count(), 1);

        let unsupported = dir.join("network.csv");
        fs::write(&unsupported, "").await?;
        assert!(load_store(&unsupported).await.is_err());
        assert!(load_store(&dir.join("missing.json")).await.is_err());

        fs::remove_dir_all(&dir).await?;
        Ok(())
    }
}
