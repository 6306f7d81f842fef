//! orangepad-core: personal prompt library
//!
//! Stores short text prompts, asks an external service for their titles and
//! tags, and serves the sorted/filtered list a UI displays:
//! - Sort and filter view over the collection (favorites always first)
//! - Title and tag normalization around the generation service
//! - Record lifecycle: create, edit, regenerate, favorite, copy, duplicate,
//!   delete, tag rename/remove
//! - Persistence in a key-value store (memory or JSON file) or SQLite
//!
//! ## Architecture
//!
//! - **`bridge`**: `setup` / `call` / `autocomplete` entry points for a host
//! - **`commands`**: "category.action" registry over JSON values
//! - **`library`**: lifecycle actions, generation sequencing
//! - **`view`** / **`metadata`**: pure transforms
//! - **`db`**: repository trait and its storage engines

// Module declarations
pub mod bridge;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod library;
pub mod logging;
pub mod metadata;
pub mod runtime;
pub mod view;

pub use config::PadConfig;
pub use db::record::PromptRecord;
pub use errors::{PadError, Result};
pub use library::{PromptEdit, PromptLibrary};
pub use metadata::MetadataGenerator;
pub use view::{arrange, SortConfig, SortField, SortOrder};
