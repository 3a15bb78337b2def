use crate::cleaner;
use crate::error::ImportError;
use crate::fetcher::PageFetcher;
use crate::llm;
use crate::model::Recipe;
use crate::providers::LlmProvider;
use crate::structured;
use log::{debug, info};

/// The full URL-to-recipe pipeline.
///
/// Holds the fetcher and LLM provider it was constructed with; every
/// invocation is otherwise independent and stateless, so one pipeline can
/// serve any number of concurrent imports.
pub struct RecipePipeline {
    fetcher: PageFetcher,
    provider: Box<dyn LlmProvider>,
}

impl RecipePipeline {
    pub fn new(fetcher: PageFetcher, provider: Box<dyn LlmProvider>) -> Self {
        Self { fetcher, provider }
    }

    /// Import one recipe: fetch the page, take the structured-data fast
    /// path when the page publishes usable JSON-LD, otherwise clean the
    /// HTML and extract via the LLM, then attach provenance.
    ///
    /// Fails with [`ImportError::FetchError`] when no fetch profile can
    /// retrieve the page and [`ImportError::ExtractionError`] when neither
    /// path yields a record with title, ingredients and instructions. A
    /// partial record is never returned.
    pub async fn import(&self, url: &str) -> Result<Recipe, ImportError> {
        info!("Importing recipe from {}", url);
        let html = self.fetcher.fetch(url).await?;

        let mut recipe = match fast_path(&html) {
            Some(recipe) => {
                info!("Structured data fast path succeeded for {}", url);
                recipe
            }
            None => {
                debug!("No usable structured data, falling back to LLM extraction");
                let page = cleaner::clean_page(&html);
                llm::extract_recipe(self.provider.as_ref(), &page).await?
            }
        };

        if !recipe.has_required_fields() {
            return Err(ImportError::ExtractionError(
                "extracted recipe is missing required fields (title, ingredients or instructions)"
                    .to_string(),
            ));
        }

        attach_provenance(&mut recipe, url);
        Ok(recipe)
    }
}

/// Try the deterministic extraction route. A structured record is accepted
/// when it already carries a title and ingredients; anything thinner falls
/// through to the LLM.
fn fast_path(html: &str) -> Option<Recipe> {
    let value = structured::find_recipe(html)?;
    let recipe = structured::normalize_recipe(&value)?;

    if recipe.title.trim().is_empty() || recipe.ingredients.is_empty() {
        debug!("Structured data present but incomplete, ignoring");
        return None;
    }

    Some(recipe)
}

/// Record where the recipe came from. `source_url` is always the literal
/// input; a hostname that cannot be parsed degrades to "Unknown" rather
/// than failing the import.
fn attach_provenance(recipe: &mut Recipe, url: &str) {
    recipe.source_url = url.to_string();
    recipe.source = reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .host_str()
                .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
        })
        .unwrap_or_else(|| "Unknown".to_string());
}
