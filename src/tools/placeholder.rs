//! Tools whose domain has no backing store yet.
//!
//! They succeed with a synthetic payload that echoes the input and carries
//! `"persisted": false`, so callers can tell "accepted but not stored" apart
//! from a real write or a failure.

use serde_json::{json, Map, Value};

const SUPPORTED_LANGUAGE_COUNT: u32 = 65;

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("zh", "Mandarin Chinese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("id", "Indonesian"),
    ("tr", "Turkish"),
    ("sv", "Swedish"),
    ("da", "Danish"),
];

/// Synthetic result for a placeholder tool. `None` for any other name.
pub(crate) fn respond(tool: &str, args: &Map<String, Value>) -> Option<Value> {
    let str_arg = |key: &str| args.get(key).and_then(Value::as_str).unwrap_or_default();

    let value = match tool {
        "create_stock" | "read_stock" | "update_stock" | "delete_stock" => echo(
            format!("Stock operation '{}' executed.", tool),
            args,
        ),
        "create_learning_module"
        | "read_learning_module"
        | "update_learning_module"
        | "delete_learning_module" => echo(
            format!("Learning module operation '{}' executed.", tool),
            args,
        ),
        "get_app_settings" => json!({
            "status": "success",
            "persisted": false,
            "settings": {
                "theme": "dark",
                "default_view": "dashboard",
                "notifications_enabled": true,
                "currency": "USD",
                "language": "en"
            }
        }),
        "update_app_settings" => json!({
            "status": "success",
            "persisted": false,
            "message": "Settings updated successfully",
            "updated_settings": args,
        }),
        "translate_content" => {
            let target = str_arg("target_language");
            json!({
                "status": "success",
                "persisted": false,
                "message": format!("Content translated to {}", target),
                "original": str_arg("content"),
                "translated": format!("[Translated to {}]", target),
            })
        }
        "set_language" => json!({
            "status": "success",
            "persisted": false,
            "message": format!(
                "Language set to {} ({})",
                str_arg("language_name"),
                str_arg("language_code")
            ),
            "language_code": str_arg("language_code"),
        }),
        "get_supported_languages" => {
            let languages: Vec<Value> = LANGUAGES
                .iter()
                .map(|(code, name)| json!({ "code": code, "name": name }))
                .collect();
            json!({
                "status": "success",
                "persisted": false,
                "total_languages": SUPPORTED_LANGUAGE_COUNT,
                "languages": languages,
            })
        }
        _ => return None,
    };

    tracing::info!(tool, "Placeholder tool answered without persisting");
    Some(value)
}

fn echo(message: String, args: &Map<String, Value>) -> Value {
    json!({
        "status": "success",
        "persisted": false,
        "message": format!("{} Not yet persisted.", message),
        "data": args,
    })
}
