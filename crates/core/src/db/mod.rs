//! Prompt persistence
//!
//! Storage is hidden behind [`PromptRepository`]. Three engines exist:
//! a whole-collection JSON array in a key-value store (memory or file) and a
//! SQLite table. Sorting and filtering never happen here, see `view`.

use crate::config::StorageConfig;
use crate::errors::Result;

pub mod collection;
pub mod kv;
pub mod prompts;
pub mod record;
pub mod schema;
#[cfg(test)]
mod prompts_test;

use collection::CollectionRepository;
use kv::{FileStore, MemoryStore};
use prompts::SqliteRepository;
use record::PromptRecord;

/// Fixed key the collection is stored under
pub const PROMPTS_STORAGE_KEY: &str = "orangepad-prompts";

/// Explicit storage interface for prompt records
pub trait PromptRepository: Send {
    /// All records, in storage order
    fn list(&self) -> Result<Vec<PromptRecord>>;

    fn get(&self, id: &str) -> Result<Option<PromptRecord>>;

    /// Insert a new record or replace the one with the same id
    fn upsert(&mut self, record: PromptRecord) -> Result<()>;

    /// Returns `false` when no record had this id
    fn remove(&mut self, id: &str) -> Result<bool>;

    fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }
}

/// Open the repository described by `storage`
pub fn open(storage: &StorageConfig, history_limit: usize) -> Result<Box<dyn PromptRepository>> {
    let repo: Box<dyn PromptRepository> = match storage {
        StorageConfig::Memory => Box::new(CollectionRepository::open(
            MemoryStore::new(),
            PROMPTS_STORAGE_KEY,
            history_limit,
        )?),
        StorageConfig::File { dir } => Box::new(CollectionRepository::open(
            FileStore::new(dir),
            PROMPTS_STORAGE_KEY,
            history_limit,
        )?),
        StorageConfig::Sqlite { path } => Box::new(SqliteRepository::open(path, history_limit)?),
    };

    tracing::info!(backend = storage.backend_name(), "prompt repository opened");
    Ok(repo)
}
