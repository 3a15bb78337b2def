use crate::cleaner::CleanedPage;
use crate::error::ImportError;
use crate::model::{Difficulty, Recipe};
use crate::providers::{build_extraction_prompt, LlmProvider};
use crate::structured::normalize::{first_digits, parse_duration_minutes};
use log::debug;
use serde::Deserialize;

/// Run the fallback extraction path: prompt the provider with the cleaned
/// page, then parse and validate its JSON response. Invoked at most once
/// per pipeline run; there is no retry with a different prompt.
pub async fn extract_recipe(
    provider: &dyn LlmProvider,
    page: &CleanedPage,
) -> Result<Recipe, ImportError> {
    let prompt = build_extraction_prompt(
        &page.html,
        page.title_hint.as_deref(),
        page.image_hint.as_deref(),
    );

    debug!(
        "Requesting extraction from '{}' ({} prompt chars)",
        provider.provider_name(),
        prompt.len()
    );
    let response = provider.complete(&prompt).await?;

    parse_response(&response)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmRecipe {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    instructions: Vec<String>,
    #[serde(default)]
    prep_time: Option<NumberOrText>,
    #[serde(default)]
    cook_time: Option<NumberOrText>,
    #[serde(default)]
    total_time: Option<NumberOrText>,
    #[serde(default)]
    servings: Option<NumberOrText>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// The prompt demands integers for times and servings, but models
/// occasionally send strings ("45", "PT45M") anyway; tolerate both at the
/// parse boundary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

impl NumberOrText {
    fn into_number(self) -> Option<u32> {
        match self {
            NumberOrText::Number(n) => Some(n),
            NumberOrText::Text(text) => {
                parse_duration_minutes(&text).or_else(|| first_digits(&text))
            }
        }
    }
}

/// Parse the raw completion text into a validated [`Recipe`].
pub(crate) fn parse_response(raw: &str) -> Result<Recipe, ImportError> {
    let without_fences = strip_code_fences(raw);
    let json_str = find_json_object(&without_fences).ok_or_else(|| {
        ImportError::ExtractionError("LLM response contained no JSON object".to_string())
    })?;

    let parsed: LlmRecipe = serde_json::from_str(json_str)
        .map_err(|e| ImportError::ExtractionError(format!("LLM response was not valid JSON: {e}")))?;

    if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
        return Err(ImportError::ExtractionError(format!(
            "LLM reported no recipe: {error}"
        )));
    }

    let recipe = Recipe {
        title: parsed.title.unwrap_or_default().trim().to_string(),
        description: parsed.description.filter(|d| !d.is_empty()),
        ingredients: non_empty(parsed.ingredients),
        instructions: non_empty(parsed.instructions),
        prep_time: parsed.prep_time.and_then(NumberOrText::into_number),
        cook_time: parsed.cook_time.and_then(NumberOrText::into_number),
        total_time: parsed.total_time.and_then(NumberOrText::into_number),
        servings: parsed.servings.and_then(NumberOrText::into_number),
        difficulty: parsed.difficulty.as_deref().and_then(Difficulty::from_label),
        image_url: parsed.image_url.filter(|u| u.starts_with("http")),
        author: parsed.author.filter(|a| !a.is_empty()),
        tags: non_empty(parsed.tags),
        cuisine: None,
        category: None,
        source: String::new(),
        source_url: String::new(),
    };

    if !recipe.has_required_fields() {
        return Err(ImportError::ExtractionError(
            "LLM response is missing required fields (title, ingredients or instructions)"
                .to_string(),
        ));
    }

    Ok(recipe)
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Models sometimes wrap the JSON in markdown fences despite the prompt;
/// drop any fence lines before hunting for the object.
fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Slice out the first balanced `{...}` substring, skipping braces inside
/// JSON string literals.
fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{
        "title": "Honey Garlic Salmon",
        "description": "Sweet and savory salmon",
        "ingredients": ["4 salmon fillets", "3 tbsp honey"],
        "instructions": ["Whisk the glaze", "Sear the salmon"],
        "prepTime": 10,
        "cookTime": 15,
        "totalTime": 25,
        "servings": 4,
        "difficulty": "easy",
        "imageUrl": "https://example.com/salmon.jpg",
        "author": "Jane Doe",
        "tags": ["seafood", "weeknight"]
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let recipe = parse_response(VALID_JSON).unwrap();
        assert_eq!(recipe.title, "Honey Garlic Salmon");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.prep_time, Some(10));
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.difficulty, Some(Difficulty::Easy));
        assert_eq!(recipe.tags, vec!["seafood", "weeknight"]);
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{VALID_JSON}\n```");
        let recipe = parse_response(&fenced).unwrap();
        assert_eq!(recipe.title, "Honey Garlic Salmon");
    }

    #[test]
    fn test_parse_response_with_prose() {
        let chatty = format!("Here is the recipe you asked for:\n{VALID_JSON}\nEnjoy!");
        let recipe = parse_response(&chatty).unwrap();
        assert_eq!(recipe.title, "Honey Garlic Salmon");
    }

    #[test]
    fn test_parse_string_minutes() {
        let raw = r#"{
            "title": "Soup",
            "ingredients": ["stock"],
            "instructions": ["Simmer"],
            "prepTime": "PT20M",
            "cookTime": "45"
        }"#;
        let recipe = parse_response(raw).unwrap();
        assert_eq!(recipe.prep_time, Some(20));
        assert_eq!(recipe.cook_time, Some(45));
    }

    #[test]
    fn test_parse_unknown_difficulty_dropped() {
        let raw = r#"{
            "title": "Soup",
            "ingredients": ["stock"],
            "instructions": ["Simmer"],
            "difficulty": "expert"
        }"#;
        let recipe = parse_response(raw).unwrap();
        assert_eq!(recipe.difficulty, None);
    }

    #[test]
    fn test_missing_required_fields() {
        let raw = r#"{"title": "Soup", "ingredients": [], "instructions": ["Simmer"]}"#;
        let result = parse_response(raw);
        assert!(matches!(result, Err(ImportError::ExtractionError(_))));
    }

    #[test]
    fn test_error_field_fails_extraction() {
        let raw = r#"{"error": "This page is a blog post, not a recipe"}"#;
        let result = parse_response(raw);
        match result {
            Err(ImportError::ExtractionError(msg)) => assert!(msg.contains("blog post")),
            other => panic!("expected ExtractionError, got {other:?}"),
        }
    }

    #[test]
    fn test_no_json_in_response() {
        let result = parse_response("Sorry, I could not find a recipe on that page.");
        assert!(matches!(result, Err(ImportError::ExtractionError(_))));
    }

    #[test]
    fn test_find_json_object_handles_braces_in_strings() {
        let text = r#"noise {"a": "value with } brace", "b": {"c": 1}} trailing"#;
        let found = find_json_object(text).unwrap();
        assert_eq!(found, r#"{"a": "value with } brace", "b": {"c": 1}}"#);
    }
}
