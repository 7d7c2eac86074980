use super::Query;
use crate::api::{GeoApi, PromptQuery};
use crate::error::Result;
use crate::model::{AiModelInfo, CategoryInfo, Prompt, PromptCategory};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelCatalog {
    pub models: Vec<AiModelInfo>,
}

impl ModelCatalog {
    pub fn available(&self) -> impl Iterator<Item = &AiModelInfo> {
        self.models.iter().filter(|m| m.available)
    }

    pub fn unavailable(&self) -> impl Iterator<Item = &AiModelInfo> {
        self.models.iter().filter(|m| !m.available)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelsQuery;

impl Query for ModelsQuery {
    type Output = ModelCatalog;
    const FAILURE: &'static str = "Failed to load models";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        Ok(ModelCatalog {
            models: api.list_models()?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PromptList {
    pub prompts: Vec<Prompt>,
    pub total: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl Query for PromptsQuery {
    type Output = PromptList;
    const FAILURE: &'static str = "Failed to load prompts";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        let page = api.list_prompts(&PromptQuery {
            page: 1,
            page_size: 200,
            category: self.category.clone(),
            search: self.search.clone().filter(|s| !s.is_empty()),
        })?;
        Ok(PromptList {
            prompts: page.items,
            total: page.total,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptCategoriesQuery;

impl Query for PromptCategoriesQuery {
    type Output = Vec<PromptCategory>;
    const FAILURE: &'static str = "Failed to load categories";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        api.prompt_categories()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndustryCategoriesQuery;

impl Query for IndustryCategoriesQuery {
    type Output = Vec<CategoryInfo>;
    const FAILURE: &'static str = "Failed to load industry categories";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        api.industry_categories()
    }
}
