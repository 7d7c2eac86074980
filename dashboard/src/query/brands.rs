use tracing::debug;

use super::Query;
use crate::api::GeoApi;
use crate::error::Result;
use crate::model::{BrandWithScore, ScoreCard};

/// All brands in the workspace, each with its latest score card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrandsQuery {
    pub page_size: u32,
}

impl Default for BrandsQuery {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

impl Query for BrandsQuery {
    type Output = Vec<BrandWithScore>;
    const FAILURE: &'static str = "Failed to fetch brands";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        let page = api.list_brands(1, self.page_size)?;
        Ok(page
            .items
            .into_iter()
            .map(|brand| {
                let score = latest_or_none(api, &brand.id);
                BrandWithScore { brand, score }
            })
            .collect())
    }
}

/// A brand that has never been evaluated simply has no score; a failed
/// score lookup must not sink the whole brand list.
fn latest_or_none(api: &dyn GeoApi, brand_id: &str) -> Option<ScoreCard> {
    match api.latest_score(brand_id) {
        Ok(score) => score,
        Err(e) => {
            debug!(brand_id, error = %e, "no score for brand");
            None
        }
    }
}

/// One brand by id, with its latest score.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrandQuery {
    pub brand_id: String,
}

impl Query for BrandQuery {
    type Output = Option<BrandWithScore>;
    const FAILURE: &'static str = "Failed to fetch brand";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        let brand = api.get_brand(&self.brand_id)?;
        let score = latest_or_none(api, &brand.id);
        Ok(Some(BrandWithScore { brand, score }))
    }

    fn enabled(&self) -> bool {
        !self.brand_id.is_empty()
    }
}

/// Score history for the selected brand, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreHistoryQuery {
    pub brand_id: Option<String>,
    pub limit: u32,
}

impl ScoreHistoryQuery {
    pub fn for_brand(brand_id: Option<String>) -> Self {
        Self { brand_id, limit: 30 }
    }
}

impl Query for ScoreHistoryQuery {
    type Output = Vec<ScoreCard>;
    const FAILURE: &'static str = "Failed to fetch score history";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        let Some(brand_id) = &self.brand_id else {
            return Ok(Vec::new());
        };
        let mut history = api.score_history(brand_id, self.limit)?;
        history.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(history)
    }

    fn enabled(&self) -> bool {
        self.brand_id.is_some()
    }
}
