use std::io;

use daypart_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "report" | "recommend" => render_envelope(&success.command, &success.data),
        "campaigns" => render_campaigns_json(&success.data),
        _ => {
            return Err(io::Error::other(format!(
                "JSON output is not supported for command `{}`",
                success.command
            )));
        }
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    if let Some(data) = &error.data {
        payload["error"]["data"] = data.clone();
    }
    serialize_json_pretty(&payload)
}

fn render_envelope(command: &str, data: &Value) -> Value {
    json!({
        "ok": true,
        "command": command,
        "version": JSON_VERSION,
        "data": data.clone()
    })
}

/// Campaign combos ordered by store, keeping sheet row order within a store.
fn render_campaigns_json(data: &Value) -> Value {
    let mut combos = data
        .get("combos")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    combos.sort_by(|left, right| value_str(left, "store_id").cmp(value_str(right, "store_id")));

    let mut envelope = render_envelope("campaigns", data);
    envelope["data"]["combos"] = Value::Array(combos);
    envelope
}

fn value_str<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or("")
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
