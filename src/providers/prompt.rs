/// The prompt used for extracting a recipe from cleaned page HTML.
///
/// It pins the exact output JSON shape and forbids surrounding prose so
/// the response can be parsed mechanically. Loaded from `prompt.txt` at
/// compile time using the `include_str!` macro, making it easy to edit
/// without dealing with Rust string syntax.
pub const RECIPE_EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

/// Build the full extraction prompt for one page.
///
/// A title hint, when present, is passed as a strong suggestion; the image
/// hint gives the model a fallback when the page markup carries none.
pub fn build_extraction_prompt(
    html: &str,
    title_hint: Option<&str>,
    image_hint: Option<&str>,
) -> String {
    let mut prompt = String::from(RECIPE_EXTRACTION_PROMPT);

    if let Some(title) = title_hint {
        prompt.push_str(&format!(
            "\nThe page's likely recipe title is \"{title}\" - prefer it unless the content clearly disagrees.\n"
        ));
    }
    if let Some(image) = image_hint {
        prompt.push_str(&format!(
            "\nIf the content has no better image, use \"{image}\" as imageUrl.\n"
        ));
    }

    prompt.push_str("\nPage content:\n\n");
    prompt.push_str(html);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!RECIPE_EXTRACTION_PROMPT.is_empty());
        assert!(RECIPE_EXTRACTION_PROMPT.contains("JSON"));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("ingredients"));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("instructions"));
    }

    #[test]
    fn test_build_prompt_includes_hints() {
        let prompt = build_extraction_prompt(
            "<article>content</article>",
            Some("Honey Garlic Salmon"),
            Some("https://example.com/salmon.jpg"),
        );
        assert!(prompt.contains("Honey Garlic Salmon"));
        assert!(prompt.contains("https://example.com/salmon.jpg"));
        assert!(prompt.ends_with("<article>content</article>"));
    }

    #[test]
    fn test_build_prompt_without_hints() {
        let prompt = build_extraction_prompt("<p>content</p>", None, None);
        assert!(!prompt.contains("likely recipe title"));
        assert!(prompt.contains("<p>content</p>"));
    }
}
