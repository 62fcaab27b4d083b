use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Render the computation envelope as one table per result section.
///
/// The metrics bundle is nested (series and comparisons under named
/// fields), so an object-of-collections result prints each collection
/// under its own heading rather than one flat field/value dump.
pub fn print_table(value: &Value) {
    let Some(map) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match map.get("result") {
        Some(result) => {
            print_result(result);

            if let Some(Value::Array(warnings)) = map.get("warnings") {
                if !warnings.is_empty() {
                    println!("\nWarnings:");
                    for w in warnings {
                        if let Value::String(s) = w {
                            println!("  - {}", s);
                        }
                    }
                }
            }

            if let Some(Value::String(meth)) = map.get("methodology") {
                println!("\nMethodology: {}", meth);
            }
        }
        None => print_value(value),
    }
}

fn print_result(result: &Value) {
    match result {
        Value::Object(map) => {
            let nested = map.values().any(|v| v.is_array() || v.is_object());
            if nested {
                let mut first = true;
                for (name, val) in map {
                    if !first {
                        println!();
                    }
                    first = false;
                    println!("[{}]", name);
                    print_value(val);
                }
            } else {
                print_value(result);
            }
        }
        other => print_value(other),
    }
}

fn print_value(value: &Value) {
    match value {
        Value::Array(arr) => print_records(arr),
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in map {
                builder.push_record([key.as_str(), &scalar(val)]);
            }
            println!("{}", Table::from(builder));
        }
        other => println!("{}", scalar(other)),
    }
}

fn print_records(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", scalar(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h).map(scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Null percentages mean "no data for this year"
        Value::Null => "—".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
