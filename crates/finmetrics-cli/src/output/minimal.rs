use serde_json::Value;

/// Print just the headline numbers from a result.
///
/// Growth output prints one `unit: pct%` line per unit; budget comparisons
/// print one `category: variance` line; anything else falls back to the
/// first scalar field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Bundle: prefer the growth section as the headline
    let result = match result.get("growth") {
        Some(growth) => growth,
        None => result,
    };

    if let Value::Array(arr) = result {
        for item in arr {
            if let Some(line) = headline(item) {
                println!("{}", line);
            }
        }
        return;
    }

    if let Value::Object(map) = result {
        if let Some(Value::Array(lines)) = map.get("lines") {
            for item in lines {
                if let Some(line) = headline(item) {
                    println!("{}", line);
                }
            }
            return;
        }

        if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_null() && !v.is_object()) {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result));
}

fn headline(item: &Value) -> Option<String> {
    let map = item.as_object()?;
    if let (Some(unit), Some(cagr)) = (map.get("unit"), map.get("cagr_pct")) {
        return Some(format!(
            "{}: {}%",
            format_minimal(unit),
            format_minimal(cagr)
        ));
    }
    if let (Some(category), Some(variance)) = (map.get("category"), map.get("variance")) {
        return Some(format!(
            "{}: {}",
            format_minimal(category),
            format_minimal(variance)
        ));
    }
    None
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
