pub mod normalize;

pub use normalize::normalize_recipe;

use log::debug;
use scraper::{Html, Selector};
use serde_json::Value;

/// Find the first schema.org Recipe object embedded in the page's JSON-LD.
///
/// Every `script[type="application/ld+json"]` block is scanned in document
/// order. A malformed block is skipped rather than aborting the scan, since
/// one broken block should not hide a valid one elsewhere in the page. The
/// parsed value may be a bare object or an array of objects; objects that
/// are not themselves a Recipe may carry one inside an `@graph` collection.
pub fn find_recipe(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script[type='application/ld+json']").unwrap();

    for (index, script) in document.select(&selector).enumerate() {
        let cleaned = sanitize_json(&script.inner_html());
        let parsed: Value = match serde_json::from_str(&cleaned) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping malformed JSON-LD block {}: {}", index, e);
                continue;
            }
        };

        let candidates: Vec<&Value> = match parsed.as_array() {
            Some(items) => items.iter().collect(),
            None => vec![&parsed],
        };

        for candidate in candidates {
            if is_recipe_type(candidate) {
                debug!("Found Recipe in JSON-LD block {}", index);
                return Some(candidate.clone());
            }

            if let Some(graph) = candidate.get("@graph").and_then(Value::as_array) {
                if let Some(recipe) = graph.iter().find(|item| is_recipe_type(item)) {
                    debug!("Found Recipe in @graph of JSON-LD block {}", index);
                    return Some(recipe.clone());
                }
            }
        }
    }

    None
}

/// The `@type` field may be a single string or an array of type names;
/// real pages disagree on capitalization.
fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(type_str)) => type_str.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Best-effort cleanup of the raw script contents before JSON parsing.
fn sanitize_json(json_str: &str) -> String {
    let mut cleaned = json_str.trim().to_string();

    // Some pages prepend stray characters before the JSON payload
    if !cleaned.starts_with('{') && !cleaned.starts_with('[') {
        if let Some(start) = cleaned.find('{') {
            cleaned = cleaned[start..].to_string();
        }
    }

    // Trailing commas and embedded HTML comments break serde_json
    cleaned = cleaned.replace(",]", "]").replace(",}", "}");
    cleaned = cleaned.replace("<!--", "").replace("-->", "");

    cleaned
}
