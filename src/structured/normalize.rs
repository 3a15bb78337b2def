use crate::model::Recipe;
use html_escape::decode_html_entities;
use serde::Deserialize;
use serde_json::Value;

/// Convert a matched JSON-LD Recipe object into a partially-populated
/// [`Recipe`]. Fields absent from the source stay absent; no LLM call is
/// made. Returns `None` when the object cannot be read as a schema.org
/// Recipe at all, which the caller treats as a fast-path miss.
pub fn normalize_recipe(value: &Value) -> Option<Recipe> {
    let schema: SchemaRecipe = serde_json::from_value(value.clone()).ok()?;

    let ingredients = schema
        .recipe_ingredient
        .into_iter()
        .filter_map(ingredient_text)
        .collect();

    let instructions = schema
        .recipe_instructions
        .map(instruction_steps)
        .unwrap_or_default();

    Some(Recipe {
        title: schema
            .name
            .map(|n| decode_html_symbols(&n))
            .unwrap_or_default(),
        description: schema.description.and_then(description_text),
        ingredients,
        instructions,
        prep_time: schema
            .prep_time
            .as_deref()
            .and_then(parse_duration_minutes),
        cook_time: schema
            .cook_time
            .as_deref()
            .and_then(parse_duration_minutes),
        total_time: schema
            .total_time
            .as_deref()
            .and_then(parse_duration_minutes),
        servings: schema.recipe_yield.and_then(servings_count),
        difficulty: None,
        image_url: schema.image.and_then(first_image),
        author: schema.author.and_then(author_name),
        tags: schema.keywords.map(keyword_tags).unwrap_or_default(),
        cuisine: schema.recipe_cuisine.and_then(first_string),
        category: schema.recipe_category.and_then(first_string),
        source: String::new(),
        source_url: String::new(),
    })
}

#[derive(Debug, Deserialize)]
struct SchemaRecipe {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<DescriptionField>,
    #[serde(default)]
    image: Option<ImageField>,
    #[serde(default, rename = "recipeIngredient")]
    recipe_ingredient: Vec<IngredientEntry>,
    #[serde(default, rename = "recipeInstructions")]
    recipe_instructions: Option<InstructionsField>,
    #[serde(default, rename = "prepTime")]
    prep_time: Option<String>,
    #[serde(default, rename = "cookTime")]
    cook_time: Option<String>,
    #[serde(default, rename = "totalTime")]
    total_time: Option<String>,
    #[serde(default, rename = "recipeYield")]
    recipe_yield: Option<YieldField>,
    #[serde(default)]
    author: Option<AuthorField>,
    #[serde(default)]
    keywords: Option<KeywordsField>,
    #[serde(default, rename = "recipeCuisine")]
    recipe_cuisine: Option<StringList>,
    #[serde(default, rename = "recipeCategory")]
    recipe_category: Option<StringList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionField {
    Text(String),
    Object { text: String },
}

fn description_text(field: DescriptionField) -> Option<String> {
    let text = match field {
        DescriptionField::Text(t) => t,
        DescriptionField::Object { text } => text,
    };
    let decoded = decode_html_symbols(&text);
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientEntry {
    Text(String),
    Object { name: Option<String> },
}

fn ingredient_text(entry: IngredientEntry) -> Option<String> {
    let text = match entry {
        IngredientEntry::Text(t) => t,
        IngredientEntry::Object { name } => name?,
    };
    let decoded = decode_html_symbols(text.trim());
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionsField {
    Text(String),
    List(Vec<InstructionEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionEntry {
    Text(String),
    Step(InstructionStep),
    Other(Value),
}

/// Covers both HowToStep (`text`/`name`) and HowToSection
/// (`itemListElement` nesting) without caring about the declared type.
#[derive(Debug, Deserialize)]
struct InstructionStep {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "itemListElement")]
    item_list_element: Option<Vec<InstructionEntry>>,
}

fn instruction_steps(field: InstructionsField) -> Vec<String> {
    let steps = match field {
        InstructionsField::Text(text) => split_instruction_text(&text),
        InstructionsField::List(entries) => {
            let mut steps = Vec::new();
            for entry in entries {
                flatten_instruction(entry, &mut steps);
            }
            steps
        }
    };

    steps
        .into_iter()
        .map(|s| decode_html_symbols(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn flatten_instruction(entry: InstructionEntry, steps: &mut Vec<String>) {
    match entry {
        InstructionEntry::Text(text) => steps.push(text),
        InstructionEntry::Step(step) => {
            if let Some(children) = step.item_list_element {
                for child in children {
                    flatten_instruction(child, steps);
                }
            } else if let Some(text) = step.text.or(step.name) {
                steps.push(text);
            }
        }
        InstructionEntry::Other(value) => steps.push(value.to_string()),
    }
}

/// Split a free-text instruction block into steps.
///
/// Newlines win when present; otherwise a sentence boundary is recognized
/// after `.`, `!` or `?` followed by whitespace. Abbreviations will
/// mis-split; that is the documented behavior of this heuristic.
pub(crate) fn split_instruction_text(text: &str) -> Vec<String> {
    if text.contains('\n') {
        return text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
    }

    let mut steps = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            let step = current.trim().to_string();
            if !step.is_empty() {
                steps.push(step);
            }
            current.clear();
        }
    }

    let last = current.trim().to_string();
    if !last.is_empty() {
        steps.push(last);
    }

    steps
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageField {
    Url(String),
    Object { url: Option<String> },
    Many(Vec<ImageField>),
}

fn first_image(field: ImageField) -> Option<String> {
    match field {
        ImageField::Url(url) if !url.is_empty() => Some(decode_html_symbols(&url)),
        ImageField::Url(_) => None,
        ImageField::Object { url } => url.filter(|u| !u.is_empty()),
        ImageField::Many(images) => images.into_iter().find_map(first_image),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YieldField {
    Count(u32),
    Text(String),
    Many(Vec<YieldField>),
}

fn servings_count(field: YieldField) -> Option<u32> {
    match field {
        YieldField::Count(n) => Some(n),
        YieldField::Text(text) => first_digits(&text),
        YieldField::Many(entries) => entries.into_iter().find_map(servings_count),
    }
}

/// First run of ASCII digits in the text, e.g. "Serves 4 to 6" -> 4.
pub(crate) fn first_digits(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Object { name: Option<String> },
    Many(Vec<AuthorField>),
}

fn author_name(field: AuthorField) -> Option<String> {
    match field {
        AuthorField::Name(name) if !name.is_empty() => Some(name),
        AuthorField::Name(_) => None,
        AuthorField::Object { name } => name.filter(|n| !n.is_empty()),
        AuthorField::Many(authors) => {
            let names: Vec<String> = authors.into_iter().filter_map(author_name).collect();
            if names.is_empty() {
                None
            } else {
                Some(names.join(", "))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordsField {
    Text(String),
    Many(Vec<String>),
}

fn keyword_tags(field: KeywordsField) -> Vec<String> {
    match field {
        KeywordsField::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        KeywordsField::Many(tags) => tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
    One(String),
    Many(Vec<String>),
}

fn first_string(list: StringList) -> Option<String> {
    match list {
        StringList::One(s) if !s.is_empty() => Some(s),
        StringList::One(_) => None,
        StringList::Many(items) => items.into_iter().find(|s| !s.is_empty()),
    }
}

/// Parse an ISO-8601-style duration (`PT1H30M`, `PT45M`, `PT2H`) into total
/// minutes. A bare seconds component (`PT5400S`) rounds to minutes. Absent
/// or unparseable input yields `None`, never zero.
pub(crate) fn parse_duration_minutes(token: &str) -> Option<u32> {
    let rest = token.trim().strip_prefix("PT")?;
    let mut minutes: u32 = 0;
    let mut matched = false;

    let after_hours = if let Some(h_pos) = rest.find('H') {
        let hours: u32 = rest[..h_pos].parse().ok()?;
        minutes += hours * 60;
        matched = true;
        &rest[h_pos + 1..]
    } else {
        rest
    };

    if let Some(m_pos) = after_hours.find('M') {
        let mins: u32 = after_hours[..m_pos].parse().ok()?;
        minutes += mins;
        matched = true;
    }

    if !matched {
        if let Some(s_pos) = rest.find('S') {
            let seconds: f64 = rest[..s_pos].parse().ok()?;
            minutes = (seconds / 60.0).round() as u32;
            matched = true;
        }
    }

    if matched {
        Some(minutes)
    } else {
        None
    }
}

fn decode_html_symbols(text: &str) -> String {
    // for some reason need to decode twice to get the correct string
    decode_html_entities(&decode_html_entities(text)).into_owned()
}
