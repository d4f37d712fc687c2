use secrecy::{ExposeSecret, SecretString};
use tokio::process::Command;

use super::types::StoreError;

/// Mutations forwarded to the `memory_jogger saved-items` CLI.
///
/// memory_jogger owns the reading-list sync, so archive/delete/favorite go
/// through it rather than touching the database directly.
#[derive(Clone)]
pub struct MemoryJoggerCli {
    bin: String,
    database_url: SecretString,
    user_id: Option<i64>,
}

impl MemoryJoggerCli {
    pub fn new(bin: impl Into<String>, database_url: SecretString, user_id: Option<i64>) -> Self {
        Self {
            bin: bin.into(),
            database_url,
            user_id,
        }
    }

    pub async fn archive(&self, item_id: i64) -> Result<(), StoreError> {
        self.run("archive", item_id).await
    }

    pub async fn delete(&self, item_id: i64) -> Result<(), StoreError> {
        self.run("delete", item_id).await
    }

    pub async fn favorite(&self, item_id: i64) -> Result<(), StoreError> {
        self.run("favorite", item_id).await
    }

    /// Argument list for one action, minus the binary.
    pub(crate) fn args(&self, action: &str, item_id: i64) -> Vec<String> {
        let mut args = vec![
            "saved-items".to_string(),
            action.to_string(),
            "--item-id".to_string(),
            item_id.to_string(),
        ];
        if let Some(user_id) = self.user_id {
            args.push("--user-id".to_string());
            args.push(user_id.to_string());
        }
        args
    }

    async fn run(&self, action: &'static str, item_id: i64) -> Result<(), StoreError> {
        tracing::info!(action, item_id, bin = %self.bin, "Running memory_jogger");
        let status = Command::new(&self.bin)
            .args(self.args(action, item_id))
            .env("DATABASE_URL", self.database_url.expose_secret())
            .status()
            .await
            .map_err(|source| StoreError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if !status.success() {
            return Err(StoreError::CommandFailed {
                action,
                item_id,
                status,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryJoggerCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryJoggerCli")
            .field("bin", &self.bin)
            .field("database_url", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}
