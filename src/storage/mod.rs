//! Saved-item store: memory_jogger's reading list.
//!
//! Reads sample the SQLite database directly; mutations go through the
//! memory_jogger CLI. The REPL only sees the [`SavedItemStore`] trait.
mod commands;
mod schema;
mod types;

pub use commands::MemoryJoggerCli;
pub use schema::Database;
pub use types::{SavedItem, StoreError};

/// The four operations the REPL needs from a reading list.
///
/// Mutations are keyed by item id and idempotent on the store side.
#[allow(async_fn_in_trait)]
pub trait SavedItemStore {
    /// One item chosen uniformly at random, or [`StoreError::Empty`].
    async fn random_item(&mut self) -> Result<SavedItem, StoreError>;
    async fn archive(&mut self, item_id: i64) -> Result<(), StoreError>;
    async fn delete(&mut self, item_id: i64) -> Result<(), StoreError>;
    async fn favorite(&mut self, item_id: i64) -> Result<(), StoreError>;
}

/// Production store: database reads plus CLI writes.
#[derive(Debug)]
pub struct MemoryJoggerStore {
    db: Database,
    cli: MemoryJoggerCli,
}

impl MemoryJoggerStore {
    pub fn new(db: Database, cli: MemoryJoggerCli) -> Self {
        Self { db, cli }
    }
}

impl SavedItemStore for MemoryJoggerStore {
    async fn random_item(&mut self) -> Result<SavedItem, StoreError> {
        self.db.random_item().await
    }

    async fn archive(&mut self, item_id: i64) -> Result<(), StoreError> {
        self.cli.archive(item_id).await
    }

    async fn delete(&mut self, item_id: i64) -> Result<(), StoreError> {
        self.cli.delete(item_id).await
    }

    async fn favorite(&mut self, item_id: i64) -> Result<(), StoreError> {
        self.cli.favorite(item_id).await
    }
}
