use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "api": {
                "type": "object",
                "properties": {
                    "base_url": { "type": "string" }
                }
            },
            "library": {
                "type": "object",
                "properties": {
                    "page_size": { "type": "integer", "minimum": 1, "maximum": 1000 }
                }
            },
            "notifications": {
                "type": "object",
                "properties": {
                    "dismiss_after_ms": { "type": "integer", "minimum": 0 }
                }
            }
        }
    })
});
