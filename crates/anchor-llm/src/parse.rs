use serde_json::Value;

/// Extracts `(tool_name, arguments)` from a Responses-API-shaped payload,
/// trying every known shape in order (spec.md §4.4 step 5, grounded in
/// `original_source/util/openai.py::openai_parse_function_call`). Arguments
/// stored as a JSON string are parsed; missing or malformed arguments
/// degrade to an empty object rather than failing the whole extraction.
pub fn parse_tool_call(resp: &Value) -> Option<(String, Value)> {
    if let Some(output) = resp.get("output").and_then(Value::as_array) {
        for item in output {
            if let Some(call) = extract_top_level_call(item) {
                return Some(call);
            }
        }
        if let Some(first) = output.first() {
            if let Some(content) = first.get("content").and_then(Value::as_array) {
                for item in content {
                    if let Some(call) = extract_top_level_call(item) {
                        return Some(call);
                    }
                }
            }
        }
    }

    if let Some(choice) = resp
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
    {
        let message = choice.get("message").unwrap_or(choice);
        if let Some(tool_call) = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .and_then(|calls| calls.first())
            .and_then(|call| call.get("function"))
        {
            return Some(extract_name_and_args(tool_call));
        }
        if let Some(function_call) = message.get("function_call") {
            return Some(extract_name_and_args(function_call));
        }
    }

    None
}

fn extract_top_level_call(item: &Value) -> Option<(String, Value)> {
    let kind = item.get("type").and_then(Value::as_str)?;
    if !matches!(kind, "tool_call" | "function_call" | "tool_use") {
        return None;
    }
    Some(extract_name_and_args(item))
}

fn extract_name_and_args(item: &Value) -> (String, Value) {
    let name = item
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let args = item
        .get("arguments")
        .or_else(|| item.get("input"))
        .cloned()
        .unwrap_or(Value::Null);
    let args = match args {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::Object(Default::default())),
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Default::default()),
    };
    (name, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_top_level_function_call() {
        let resp = json!({
            "output": [
                { "type": "function_call", "name": "emit_tasks", "arguments": "{\"tasks\":[]}" }
            ]
        });
        let (name, args) = parse_tool_call(&resp).unwrap();
        assert_eq!(name, "emit_tasks");
        assert_eq!(args, json!({"tasks": []}));
    }

    #[test]
    fn parses_nested_content_tool_call() {
        let resp = json!({
            "output": [
                { "content": [
                    { "type": "tool_call", "name": "judge_condition", "arguments": "{\"state\":\"unknown\"}" }
                ] }
            ]
        });
        let (name, args) = parse_tool_call(&resp).unwrap();
        assert_eq!(name, "judge_condition");
        assert_eq!(args["state"], "unknown");
    }

    #[test]
    fn parses_legacy_tool_calls_shape() {
        let resp = json!({
            "choices": [
                { "message": { "tool_calls": [
                    { "function": { "name": "emit_conditions", "arguments": "{\"conditions\":[]}" } }
                ] } }
            ]
        });
        let (name, args) = parse_tool_call(&resp).unwrap();
        assert_eq!(name, "emit_conditions");
        assert_eq!(args, json!({"conditions": []}));
    }

    #[test]
    fn parses_legacy_function_call_shape() {
        let resp = json!({
            "choices": [
                { "message": { "function_call": { "name": "emit_tasks", "arguments": "not json" } } }
            ]
        });
        let (name, args) = parse_tool_call(&resp).unwrap();
        assert_eq!(name, "emit_tasks");
        assert_eq!(args, json!({}));
    }

    #[test]
    fn returns_none_when_no_shape_matches() {
        let resp = json!({ "unrelated": true });
        assert!(parse_tool_call(&resp).is_none());
    }
}
