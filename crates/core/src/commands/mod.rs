//! Command registry and dispatch system
//!
//! Commands are registered as "category.action" (e.g. "prompts.list",
//! "tags.rename") and dispatched to handler functions that take and return
//! JSON values.
//!
//! ## Adding a new command
//!
//! 1. Create handler function: `pub fn my_command(args: Value) -> Result<Value>`
//! 2. Register in `REGISTRY`: `("category.action", my_command as CommandHandler)`
//! 3. Add tests for the command

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::{PadError, Result};

pub mod prompts;
pub mod tags;

/// All command handlers take a JSON Value (arguments) and return a Result<Value>
pub type CommandHandler = fn(Value) -> Result<Value>;

/// Static command registry, initialized lazily on first access
static REGISTRY: Lazy<HashMap<&'static str, CommandHandler>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert("ping", ping as CommandHandler);

    // Prompts
    map.insert("prompts.list", prompts::list as CommandHandler);
    map.insert("prompts.get", prompts::get as CommandHandler);
    map.insert("prompts.create", prompts::create as CommandHandler);
    map.insert("prompts.update", prompts::update as CommandHandler);
    map.insert("prompts.regenerate", prompts::regenerate as CommandHandler);
    map.insert("prompts.delete", prompts::delete as CommandHandler);
    map.insert("prompts.use", prompts::use_prompt as CommandHandler);
    map.insert("prompts.favorite", prompts::favorite as CommandHandler);
    map.insert("prompts.duplicate", prompts::duplicate as CommandHandler);

    // Tags
    map.insert("tags.list", tags::list as CommandHandler);
    map.insert("tags.remove", tags::remove as CommandHandler);
    map.insert("tags.rename", tags::rename as CommandHandler);

    map
});

/// Dispatch a command by name
pub fn dispatch(command: &str, args: Value) -> Result<Value> {
    match REGISTRY.get(command) {
        Some(handler) => {
            tracing::debug!(command, "dispatching command");
            handler(args)
        },
        None => Err(PadError::CommandNotFound(command.to_string())),
    }
}

/// Sorted list of all registered command names
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = REGISTRY.keys().map(|&k| k.to_string()).collect();
    commands.sort();
    commands
}

/// Required string argument
pub(crate) fn required_str<'a>(command: &str, args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| PadError::invalid_args(command, format!("missing string field '{}'", key)))
}

/// Optional string argument; present but not a string is an error
pub(crate) fn optional_str<'a>(command: &str, args: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(PadError::invalid_args(
            command,
            format!("field '{}' must be a string", key),
        )),
    }
}

// ============================================================================
// Test Commands
// ============================================================================

/// Ping command - echoes the input arguments with an added "pong" field
///
/// # Example
/// ```json
/// // Input:  {"message": "hello"}
/// // Output: {"message": "hello", "pong": true}
/// ```
fn ping(args: Value) -> Result<Value> {
    let mut result = match args {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    result.insert("pong".to_string(), Value::Bool(true));
    Ok(Value::Object(result))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Once;

    use serde_json::json;

    static SETUP: Once = Once::new();

    /// Install an in-memory global library for command tests
    pub fn ensure_library() {
        SETUP.call_once(|| {
            let result = crate::bridge::setup(json!({"storage": {"backend": "memory"}}));
            assert!(result.get("error").is_none(), "setup failed: {}", result);
        });
    }
}
