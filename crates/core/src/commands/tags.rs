use serde_json::{json, Value};

use super::required_str;
use crate::errors::Result;
use crate::library;

/// Every tag in the collection, sorted
pub fn list(_args: Value) -> Result<Value> {
    let tags = library::global()?.all_tags()?;
    Ok(json!({ "tags": tags }))
}

/// `{id, tag}`
pub fn remove(args: Value) -> Result<Value> {
    let id = required_str("tags.remove", &args, "id")?;
    let tag = required_str("tags.remove", &args, "tag")?;

    let prompt = library::global()?.remove_tag(id, tag)?;
    Ok(json!(prompt))
}

/// `{id, from, to}`
pub fn rename(args: Value) -> Result<Value> {
    let id = required_str("tags.rename", &args, "id")?;
    let from = required_str("tags.rename", &args, "from")?;
    let to = required_str("tags.rename", &args, "to")?;

    let prompt = library::global()?.rename_tag(id, from, to)?;
    Ok(json!(prompt))
}
