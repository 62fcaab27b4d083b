use serde_json::Value;
use std::io;

/// Write the result as CSV to stdout.
///
/// Arrays of records become ordinary CSV tables. A nested bundle becomes
/// one table per section, separated by a blank line with the section name
/// as a comment-style header row.
pub fn print_csv(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result {
        Value::Array(arr) => write_records(&mut wtr, arr),
        Value::Object(map) => {
            let nested = map.values().any(|v| v.is_array() || v.is_object());
            if nested {
                for (name, val) in map {
                    let _ = wtr.write_record([format!("# {}", name)]);
                    match val {
                        Value::Array(arr) => write_records(&mut wtr, arr),
                        Value::Object(obj) => write_fields(&mut wtr, obj),
                        other => {
                            let _ = wtr.write_record([name.as_str(), &format_csv_value(other)]);
                        }
                    }
                }
            } else {
                write_fields(&mut wtr, map);
            }
        }
        other => {
            let _ = wtr.write_record([&format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    map: &serde_json::Map<String, Value>,
) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        match val {
            // One level of nesting inside a section (e.g. comparison lines)
            Value::Array(arr) => write_records(wtr, arr),
            _ => {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
    }
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
