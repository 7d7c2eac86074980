pub mod envelope;
pub mod http;
pub mod mock;

use crate::error::Result;
use crate::model::{
    AiModelInfo, Article, AuthToken, Brand, CategoryInfo, DiagnosisHistoryItem, DiagnosisReport,
    EvaluationCreate, EvaluationResult, EvaluationRun, EvaluationRunDetail, EvaluationStatus,
    LoginCredentials, Page, Prompt, PromptCategory, RegisterData, ScoreCard, User,
};

pub use http::HttpApi;
pub use mock::MockApi;

/// Prompt listing parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptQuery {
    pub page: u32,
    pub page_size: u32,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Everything the dashboard asks of the GEO backend.
///
/// Implementations are shared across collector threads, so they must be
/// `Send + Sync`. Workspace scoping is the implementation's concern.
pub trait GeoApi: Send + Sync {
    // auth
    fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken>;
    fn register(&self, data: &RegisterData) -> Result<User>;
    fn logout(&self) -> Result<()>;
    fn me(&self) -> Result<User>;

    // brands & scores
    fn list_brands(&self, page: u32, page_size: u32) -> Result<Page<Brand>>;
    fn get_brand(&self, brand_id: &str) -> Result<Brand>;
    /// `Ok(None)` when the brand has never been scored.
    fn latest_score(&self, brand_id: &str) -> Result<Option<ScoreCard>>;
    fn score_history(&self, brand_id: &str, limit: u32) -> Result<Vec<ScoreCard>>;

    // evaluations
    fn list_evaluations(&self, status: Option<EvaluationStatus>) -> Result<Vec<EvaluationRun>>;
    fn get_evaluation(&self, run_id: &str) -> Result<EvaluationRunDetail>;
    fn create_evaluation(&self, request: &EvaluationCreate) -> Result<EvaluationRun>;
    fn evaluation_results(
        &self,
        run_id: &str,
        brand_id: Option<&str>,
        model_name: Option<&str>,
    ) -> Result<Vec<EvaluationResult>>;

    // catalog
    fn list_models(&self) -> Result<Vec<AiModelInfo>>;
    fn list_prompts(&self, query: &PromptQuery) -> Result<Page<Prompt>>;
    fn prompt_categories(&self) -> Result<Vec<PromptCategory>>;
    fn industry_categories(&self) -> Result<Vec<CategoryInfo>>;

    // content
    fn list_articles(&self, category: Option<&str>, page_size: u32) -> Result<Page<Article>>;
    fn diagnosis_report(&self, report_id: &str) -> Result<DiagnosisReport>;
    fn diagnosis_history(&self) -> Result<Vec<DiagnosisHistoryItem>>;

    fn health(&self) -> bool;
}
