use log::debug;
use scraper::{ElementRef, Html, Node, Selector};

/// Upper bound on the fragment handed to the LLM.
pub const MAX_FRAGMENT_LEN: usize = 60_000;

/// A container must have at least this much visible text to be treated as
/// the recipe content.
const MIN_CONTENT_LEN: usize = 500;

/// Candidate recipe containers, most specific (plugin-branded markup)
/// first, generic article markup last.
const CONTAINER_SELECTORS: &[&str] = &[
    ".wprm-recipe-container",
    ".tasty-recipes",
    ".mv-create-wrapper",
    "[itemtype*='Recipe']",
    ".recipe-card",
    ".recipe-content",
    ".recipe",
    "main article",
    "article",
];

const TITLE_SELECTORS: &[&str] = &[
    "h1.recipe-title",
    ".wprm-recipe-name",
    ".tasty-recipes-title",
    "[itemprop='name']",
    "h1.entry-title",
    "h1",
];

const IMAGE_SELECTORS: &[&str] = &[
    "meta[property='og:image']",
    ".wprm-recipe-image img",
    "[itemprop='image']",
    "img[class*='recipe']",
];

const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "canvas", "form", "nav", "footer", "header",
    "aside", "button",
];

const JUNK_MARKERS: &[&str] = &[
    "comment",
    "sidebar",
    "advert",
    "promo",
    "newsletter",
    "social",
    "share",
    "related",
    "breadcrumb",
];

/// Decluttered page content plus weak hints for prompting.
#[derive(Debug, Clone)]
pub struct CleanedPage {
    pub html: String,
    pub title_hint: Option<String>,
    pub image_hint: Option<String>,
}

/// Strip non-content markup, keep the most likely recipe container, and
/// collect weak title/image hints. Hints are best-effort and may be absent.
pub fn clean_page(html: &str) -> CleanedPage {
    let document = Html::parse_document(html);

    let fragment = select_content(&document)
        .unwrap_or_else(|| html.to_string());

    CleanedPage {
        html: truncate_on_char_boundary(fragment, MAX_FRAGMENT_LEN),
        title_hint: title_hint(&document),
        image_hint: image_hint(&document),
    }
}

/// Pick the first candidate container with enough visible text, falling
/// back to the whole body. `None` means the page has no body at all.
fn select_content(document: &Html) -> Option<String> {
    for selector_str in CONTAINER_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        for candidate in document.select(&selector) {
            let text_len = visible_text(&candidate).len();
            if text_len > MIN_CONTENT_LEN {
                debug!(
                    "Using '{}' as recipe container ({} chars of text)",
                    selector_str, text_len
                );
                return Some(serialize_clean(&candidate));
            }
        }
    }

    let body = Selector::parse("body").unwrap();
    document.select(&body).next().map(|el| {
        debug!("No recipe container matched, keeping whole body");
        serialize_clean(&el)
    })
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element
            .value()
            .attr("style")
            .map(|s| s.contains("display: none") || s.contains("visibility: hidden"))
            .unwrap_or(false)
}

fn is_junk(element: &ElementRef) -> bool {
    let value = element.value();
    let tag = value.name().to_lowercase();
    if SKIP_TAGS.contains(&tag.as_str()) {
        return true;
    }

    let mut markers = value.classes().map(str::to_lowercase).collect::<Vec<_>>();
    if let Some(id) = value.id() {
        markers.push(id.to_lowercase());
    }

    markers.iter().any(|m| {
        m == "ad" || m == "ads" || JUNK_MARKERS.iter().any(|junk| m.contains(junk))
    })
}

/// Text content of the element with junk and hidden subtrees excluded.
fn visible_text(element: &ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: &ElementRef, out: &mut String) {
    if is_junk(element) || is_hidden(element) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(trimmed);
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, out);
                }
            }
            _ => {}
        }
    }
}

/// Re-serialize the element tree without junk subtrees or attributes.
/// Bare tags plus text are all the LLM needs, and dropping attributes
/// keeps the fragment well under the size cap for most pages.
fn serialize_clean(element: &ElementRef) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_element(element: &ElementRef, out: &mut String) {
    if is_junk(element) || is_hidden(element) {
        return;
    }

    let tag = element.value().name().to_lowercase();
    out.push('<');
    out.push_str(&tag);
    out.push('>');

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push_str(trimmed);
                    out.push(' ');
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    write_element(&child_ref, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn title_hint(document: &Html) -> Option<String> {
    for selector_str in TITLE_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        for candidate in document.select(&selector) {
            let text = candidate.text().collect::<String>().trim().to_string();
            if (3..=200).contains(&text.len()) {
                return Some(text);
            }
        }
    }
    None
}

fn image_hint(document: &Html) -> Option<String> {
    for selector_str in IMAGE_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        for candidate in document.select(&selector) {
            let url = candidate
                .value()
                .attr("src")
                .or_else(|| candidate.value().attr("content"));
            if let Some(url) = url {
                if url.starts_with("http") {
                    return Some(url.to_string());
                }
            }
        }
    }
    None
}

fn truncate_on_char_boundary(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text
}
