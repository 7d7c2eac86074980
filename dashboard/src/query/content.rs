use super::Query;
use crate::api::GeoApi;
use crate::error::Result;
use crate::model::{Article, DiagnosisHistoryItem, DiagnosisReport};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticlesQuery {
    pub category: Option<String>,
    pub page_size: u32,
}

impl Default for ArticlesQuery {
    fn default() -> Self {
        Self {
            category: None,
            page_size: 50,
        }
    }
}

impl Query for ArticlesQuery {
    type Output = Vec<Article>;
    const FAILURE: &'static str = "Failed to load articles";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        Ok(api
            .list_articles(self.category.as_deref(), self.page_size)?
            .items)
    }
}

/// Diagnosis report by id; the id comes straight from the route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub report_id: Option<String>,
}

impl Query for ReportQuery {
    type Output = Option<DiagnosisReport>;
    const FAILURE: &'static str = "Failed to load report";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        match &self.report_id {
            Some(id) => api.diagnosis_report(id).map(Some),
            None => Ok(None),
        }
    }

    fn enabled(&self) -> bool {
        self.report_id.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosisHistoryQuery;

impl Query for DiagnosisHistoryQuery {
    type Output = Vec<DiagnosisHistoryItem>;
    const FAILURE: &'static str = "Failed to load history";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        api.diagnosis_history()
    }
}
