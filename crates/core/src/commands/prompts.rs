use serde_json::{json, Value};

use super::{optional_str, required_str};
use crate::errors::{PadError, Result};
use crate::library::{self, PromptEdit};
use crate::runtime;
use crate::view::{SortConfig, SortField, SortOrder};

/// `{sort?, order?, filter?}` → `{prompts}` in display order
pub fn list(args: Value) -> Result<Value> {
    let library = library::global()?;

    let sort = parse_sort(&args, library.default_sort())?;
    let filter = optional_str("prompts.list", &args, "filter")?;

    let prompts = library.view(Some(sort), filter)?;
    Ok(json!({ "prompts": prompts }))
}

pub fn get(args: Value) -> Result<Value> {
    let id = required_str("prompts.get", &args, "id")?;
    let prompt = library::global()?.get(id)?;
    Ok(json!(prompt))
}

pub fn create(args: Value) -> Result<Value> {
    let text = required_str("prompts.create", &args, "text")?;
    let library = library::global()?;

    let prompt = runtime::block_on(library.create(text))?;
    Ok(json!(prompt))
}

/// `{id, text, title?}`
pub fn update(args: Value) -> Result<Value> {
    let id = required_str("prompts.update", &args, "id")?;
    let text = required_str("prompts.update", &args, "text")?;
    let title = optional_str("prompts.update", &args, "title")?;
    let library = library::global()?;

    let edit = PromptEdit {
        text:  text.to_string(),
        title: title.map(String::from),
    };
    let prompt = runtime::block_on(library.edit(id, edit))?;
    Ok(json!(prompt))
}

pub fn regenerate(args: Value) -> Result<Value> {
    let id = required_str("prompts.regenerate", &args, "id")?;
    let library = library::global()?;

    let prompt = runtime::block_on(library.regenerate(id))?;
    Ok(json!(prompt))
}

pub fn delete(args: Value) -> Result<Value> {
    let id = required_str("prompts.delete", &args, "id")?;
    let removed = library::global()?.delete(id)?;
    Ok(json!({ "success": true, "prompt": removed }))
}

/// The prompt was copied
pub fn use_prompt(args: Value) -> Result<Value> {
    let id = required_str("prompts.use", &args, "id")?;
    let prompt = library::global()?.record_use(id)?;
    Ok(json!(prompt))
}

pub fn favorite(args: Value) -> Result<Value> {
    let id = required_str("prompts.favorite", &args, "id")?;
    let prompt = library::global()?.toggle_favorite(id)?;
    Ok(json!(prompt))
}

pub fn duplicate(args: Value) -> Result<Value> {
    let id = required_str("prompts.duplicate", &args, "id")?;
    let prompt = library::global()?.duplicate(id)?;
    Ok(json!(prompt))
}

fn parse_sort(args: &Value, default: SortConfig) -> Result<SortConfig> {
    let field = match optional_str("prompts.list", args, "sort")? {
        Some(raw) => raw
            .parse::<SortField>()
            .map_err(|e| PadError::invalid_args("prompts.list", e.user_message()))?,
        None => default.field,
    };
    let order = match optional_str("prompts.list", args, "order")? {
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|e| PadError::invalid_args("prompts.list", e.user_message()))?,
        None => default.order,
    };
    Ok(SortConfig::new(field, order))
}
