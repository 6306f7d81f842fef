//! Host boundary
//!
//! The three entry points an embedding host (editor plugin, CLI, UI shell)
//! calls: `setup`, `call` and `autocomplete`. Everything crosses as
//! `serde_json::Value`, and no error escapes as a panic or `Err`: failures
//! become `{error: true, message, category}` objects.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::commands;
use crate::config::PadConfig;
use crate::errors::{PadError, Result};
use crate::library::{self, PromptLibrary};
use crate::logging;
use crate::metadata::{MetadataGenerator, NoopGenerator};

/// Configure logging and open the prompt library
///
/// Called once by the host with a configuration object (`null` for defaults).
/// Later calls leave the installed library in place.
pub fn setup(config: Value) -> Value {
    setup_with_generator(config, Arc::new(NoopGenerator))
}

/// [`setup`] with a real title/tag generation service wired in
pub fn setup_with_generator(config: Value, generator: Arc<dyn MetadataGenerator>) -> Value {
    match setup_impl(config, generator) {
        Ok(result) => result,
        Err(err) => create_error_object(&err),
    }
}

/// Main entry point for command execution
///
/// `command` is a registry name such as "prompts.list"; `args` its JSON
/// arguments.
pub fn call(command: &str, args: Value) -> Value {
    match commands::dispatch(command, args) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(command, category = err.category(), error = %err, "command failed");
            create_error_object(&err)
        },
    }
}

/// Completion candidates for `kind` starting with `prefix`
///
/// Only `"tag"` is supported. Never fails visibly: errors are logged and an
/// empty list returned.
pub fn autocomplete(kind: &str, prefix: &str) -> Vec<String> {
    match autocomplete_impl(kind, prefix) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(kind, error = %err, "autocomplete failed");
            Vec::new()
        },
    }
}

fn setup_impl(config: Value, generator: Arc<dyn MetadataGenerator>) -> Result<Value> {
    let config = PadConfig::from_value(config)?;
    logging::init(&config.log_level);

    if library::global().is_ok() {
        tracing::debug!("setup called again, keeping the existing library");
        return Ok(json!({ "ok": true, "alreadyInitialized": true }));
    }

    let library = PromptLibrary::open(&config, generator)?;
    let count = library.list()?.len();
    if !library::install(library) {
        tracing::debug!("library installed concurrently, keeping the existing one");
    }

    tracing::info!(backend = config.storage.backend_name(), prompts = count, "orangepad ready");
    Ok(json!({
        "ok": true,
        "backend": config.storage.backend_name(),
        "prompts": count,
    }))
}

fn autocomplete_impl(kind: &str, prefix: &str) -> Result<Vec<String>> {
    match kind {
        "tag" => library::global()?.tags_with_prefix(prefix),
        _ => Ok(Vec::new()),
    }
}

/// Structured error object for the host
fn create_error_object(err: &PadError) -> Value {
    json!({
        "error": true,
        "message": err.user_message(),
        "category": err.category(),
    })
}
