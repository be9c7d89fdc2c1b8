use crate::seo::select_all;
use scraper::Html;
use serde_json::Value;

/// Maximum number of distinct `@type` values kept
const MAX_TYPES: usize = 10;

/// Counts JSON-LD blocks and collects their `@type` values
///
/// Types are gathered from any depth (including `@graph` arrays),
/// deduplicated case-insensitively in discovery order and capped. A block
/// with malformed JSON still counts but contributes no types.
pub fn extract_structured_data(document: &Html) -> (usize, Vec<String>) {
    let mut count = 0;
    let mut types = Vec::new();

    for script in select_all(document, "script[type]") {
        let is_json_ld = script
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }

        count += 1;
        let content = script.text().collect::<String>();
        match serde_json::from_str::<Value>(content.trim()) {
            Ok(value) => collect_types(&value, &mut types),
            Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }

    (count, types)
}

fn collect_types(value: &Value, types: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(declared) = map.get("@type") {
                match declared {
                    Value::String(name) => push_type(name, types),
                    Value::Array(names) => names
                        .iter()
                        .filter_map(Value::as_str)
                        .for_each(|name| push_type(name, types)),
                    _ => {}
                }
            }
            for (key, nested) in map {
                if key != "@type" {
                    collect_types(nested, types);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_types(item, types)),
        _ => {}
    }
}

fn push_type(name: &str, types: &mut Vec<String>) {
    let name = name.trim();
    if name.is_empty() || types.len() >= MAX_TYPES {
        return;
    }
    if !types.iter().any(|t| t.eq_ignore_ascii_case(name)) {
        types.push(name.to_string());
    }
}
